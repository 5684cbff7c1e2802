//! CSV persistence for one tile's point correspondences.
//!
//! # File format
//!
//! ```text
//! LeftImage: OPT/tile_0_0.png
//! RightImage: SAR/tile_0_0.png
//! --------------------------------------------------
//! ID,LeftX,LeftY,RightX,RightY
//! 1,10,10,12,11
//! ```
//!
//! The preamble rows are free-form; loading scans for the first record whose
//! first field is exactly `ID` and treats everything after it as data. Data
//! records with fewer than five fields are skipped silently (forward
//! compatible with extra columns), but a non-integer coordinate fails the
//! whole load so partial point sets are never applied.

use std::path::Path;

use thiserror::Error;

use crate::correspondence::{CorrespondenceStore, Point};

/// Separator row written between the image labels and the column header.
const SEPARATOR: &str = "--------------------------------------------------";

/// Errors from CSV save/load operations.
#[derive(Error, Debug)]
pub enum CsvError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Left/right point counts differ; the file would be unbalanced
    #[error("point count mismatch: {left} left vs {right} right")]
    CountMismatch {
        /// Points on the left side
        left: usize,
        /// Points on the right side
        right: usize,
    },

    /// A coordinate field failed to parse as an integer
    #[error("invalid coordinate '{value}' in record {record}")]
    Parse {
        /// 1-based data record number
        record: usize,
        /// The offending field content
        value: String,
    },
}

/// Write a store's completed pairs to `path`.
///
/// IDs are renumbered 1..N positionally at write time. Fails with
/// [`CsvError::CountMismatch`] when the sides are unbalanced, before touching
/// the filesystem.
pub fn save(
    path: &Path,
    left_label: &str,
    right_label: &str,
    store: &CorrespondenceStore,
) -> Result<(), CsvError> {
    let left = store.left_points().len();
    let right = store.right_points().len();
    if left != right {
        return Err(CsvError::CountMismatch { left, right });
    }

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    writer.write_record([format!("LeftImage: {left_label}")])?;
    writer.write_record([format!("RightImage: {right_label}")])?;
    writer.write_record([SEPARATOR])?;
    writer.write_record(["ID", "LeftX", "LeftY", "RightX", "RightY"])?;

    for pair in store.pairs() {
        writer.write_record([
            pair.id.to_string(),
            pair.left.x.to_string(),
            pair.left.y.to_string(),
            pair.right.x.to_string(),
            pair.right.y.to_string(),
        ])?;
    }

    writer.flush()?;
    log::info!("Saved {} pairs to {:?}", store.pair_count(), path);
    Ok(())
}

/// Read point pairs back from `path`.
///
/// All-or-nothing: any parse failure returns an error and no points.
pub fn load(path: &Path) -> Result<Vec<(Point, Point)>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut pairs = Vec::new();
    let mut in_data = false;
    let mut record_no = 0usize;

    for record in reader.records() {
        let record = record?;
        if !in_data {
            in_data = record.get(0) == Some("ID");
            continue;
        }

        record_no += 1;
        if record.len() < 5 {
            log::warn!(
                "Skipping short record {} in {:?} ({} fields)",
                record_no,
                path,
                record.len()
            );
            continue;
        }

        // Field 0 is the positional ID; it is recomputed on save, so only
        // the four coordinates matter here.
        let mut coords = [0i32; 4];
        for (slot, field) in coords.iter_mut().zip(record.iter().skip(1).take(4)) {
            *slot = field.trim().parse().map_err(|_| CsvError::Parse {
                record: record_no,
                value: field.to_string(),
            })?;
        }

        pairs.push((
            Point::new(coords[0], coords[1]),
            Point::new(coords[2], coords[3]),
        ));
    }

    log::info!("Loaded {} pairs from {:?}", pairs.len(), path);
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_store() -> CorrespondenceStore {
        let mut store = CorrespondenceStore::new();
        store.add_left(Point::new(10, 10)).unwrap();
        store.add_right(Point::new(12, 11)).unwrap();
        store.add_left(Point::new(200, 300)).unwrap();
        store.add_right(Point::new(205, 298)).unwrap();
        store
    }

    #[test]
    fn test_save_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile_0_0_points.csv");

        save(&path, "OPT/tile_0_0.png", "SAR/tile_0_0.png", &sample_store()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "LeftImage: OPT/tile_0_0.png");
        assert_eq!(lines[1], "RightImage: SAR/tile_0_0.png");
        assert_eq!(lines[2], SEPARATOR);
        assert_eq!(lines[3], "ID,LeftX,LeftY,RightX,RightY");
        assert_eq!(lines[4], "1,10,10,12,11");
        assert_eq!(lines[5], "2,200,300,205,298");
    }

    #[test]
    fn test_roundtrip_preserves_points_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");
        let store = sample_store();

        save(&path, "OPT/a.png", "SAR/a.png", &store).unwrap();
        let pairs = load(&path).unwrap();

        let expected: Vec<(Point, Point)> = store
            .left_points()
            .iter()
            .copied()
            .zip(store.right_points().iter().copied())
            .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_save_unbalanced_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");

        let mut store = sample_store();
        store.add_left(Point::new(1, 1)).unwrap();

        let err = save(&path, "OPT/a.png", "SAR/a.png", &store).unwrap_err();
        assert!(matches!(
            err,
            CsvError::CountMismatch { left: 3, right: 2 }
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_skips_short_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "ID,LeftX,LeftY,RightX,RightY\n1,10,10\n").unwrap();

        let pairs = load(&path).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_load_tolerates_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(
            &path,
            "ID,LeftX,LeftY,RightX,RightY\n1,10,20,30,40,extra\n",
        )
        .unwrap();

        let pairs = load(&path).unwrap();
        assert_eq!(pairs, vec![(Point::new(10, 20), Point::new(30, 40))]);
    }

    #[test]
    fn test_load_bad_coordinate_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(
            &path,
            "ID,LeftX,LeftY,RightX,RightY\n1,10,20,30,40\n2,10,oops,30,40\n",
        )
        .unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, CsvError::Parse { record: 2, .. }));
    }

    #[test]
    fn test_load_without_header_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "1,10,20,30,40\n2,11,21,31,41\n").unwrap();

        // No ID header row means no data section.
        let pairs = load(&path).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_delete_then_save_renumbers_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("points.csv");

        let mut store = sample_store();
        store.add_left(Point::new(5, 5)).unwrap();
        store.add_right(Point::new(6, 6)).unwrap();
        store.delete_at(0).unwrap();

        save(&path, "OPT/a.png", "SAR/a.png", &store).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let data: Vec<&str> = content.lines().skip(4).collect();
        assert_eq!(data, vec!["1,200,300,205,298", "2,5,5,6,6"]);
    }
}
