//! Tile-set discovery and lookup.
//!
//! A tile is one optical/radar image pair sharing a filename. The tile set is
//! the filename intersection of the two source directories, ordered by
//! ascending modification time of the optical copy (tiles are produced in
//! spatial order, so mtime order matches the operator's expected traversal).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

/// Errors from tile-set operations.
#[derive(Error, Debug)]
pub enum TileError {
    /// I/O error while scanning a source directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A searched-for tile is not part of the loaded set
    #[error("tile not found: {name}")]
    NotFound {
        /// The resolved filename that was searched for
        name: String,
    },
}

/// The ordered tile list plus its two source directories.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    optical_dir: PathBuf,
    radar_dir: PathBuf,
    names: Vec<String>,
}

impl TileSet {
    /// Build the tile set from two source directories.
    ///
    /// Non-UTF-8 filenames are skipped; they cannot round-trip through the
    /// annotation CSV preamble.
    pub fn scan(optical_dir: &Path, radar_dir: &Path) -> Result<Self, TileError> {
        let radar_names: HashSet<String> = list_names(radar_dir)?.into_iter().collect();

        let mut names: Vec<(String, SystemTime)> = Vec::new();
        for name in list_names(optical_dir)? {
            if !radar_names.contains(&name) {
                continue;
            }
            let mtime = std::fs::metadata(optical_dir.join(&name))?.modified()?;
            names.push((name, mtime));
        }
        names.sort_by_key(|(_, mtime)| *mtime);

        log::info!(
            "Scanned tile set: {} tiles shared by {:?} and {:?}",
            names.len(),
            optical_dir,
            radar_dir
        );

        Ok(Self {
            optical_dir: optical_dir.to_path_buf(),
            radar_dir: radar_dir.to_path_buf(),
            names: names.into_iter().map(|(name, _)| name).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Path of a tile's optical copy.
    pub fn optical_path(&self, name: &str) -> PathBuf {
        self.optical_dir.join(name)
    }

    /// Path of a tile's radar copy.
    pub fn radar_path(&self, name: &str) -> PathBuf {
        self.radar_dir.join(name)
    }

    /// Resolve a bare search token `"X_Y"` to the index of `tile_X_Y.png`.
    pub fn resolve_search(&self, token: &str) -> Result<usize, TileError> {
        let name = format!("tile_{}.png", token.trim());
        self.names
            .iter()
            .position(|n| *n == name)
            .ok_or(TileError::NotFound { name })
    }
}

/// Annotation filename for a tile: `<stem>_points.csv`.
pub fn annotation_filename(tile_name: &str) -> String {
    let stem = Path::new(tile_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(tile_name);
    format!("{stem}_points.csv")
}

fn list_names(dir: &Path) -> Result<Vec<String>, TileError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_scan_intersects_directories() {
        let opt = TempDir::new().unwrap();
        let sar = TempDir::new().unwrap();
        touch(opt.path(), "tile_0_0.png");
        touch(opt.path(), "tile_0_512.png");
        touch(opt.path(), "only_optical.png");
        touch(sar.path(), "tile_0_0.png");
        touch(sar.path(), "tile_0_512.png");
        touch(sar.path(), "only_radar.png");

        let tiles = TileSet::scan(opt.path(), sar.path()).unwrap();

        assert_eq!(tiles.len(), 2);
        assert!(tiles.names().contains(&"tile_0_0.png".to_string()));
        assert!(tiles.names().contains(&"tile_0_512.png".to_string()));
    }

    #[test]
    fn test_scan_orders_by_mtime() {
        let opt = TempDir::new().unwrap();
        let sar = TempDir::new().unwrap();
        touch(sar.path(), "b.png");
        touch(sar.path(), "a.png");

        // Create optical copies with distinct mtimes, newest-named first.
        touch(opt.path(), "b.png");
        std::thread::sleep(std::time::Duration::from_millis(20));
        touch(opt.path(), "a.png");

        let tiles = TileSet::scan(opt.path(), sar.path()).unwrap();
        assert_eq!(tiles.names(), &["b.png".to_string(), "a.png".to_string()]);
    }

    #[test]
    fn test_resolve_search() {
        let opt = TempDir::new().unwrap();
        let sar = TempDir::new().unwrap();
        touch(opt.path(), "tile_0_512.png");
        touch(sar.path(), "tile_0_512.png");

        let tiles = TileSet::scan(opt.path(), sar.path()).unwrap();

        assert_eq!(tiles.resolve_search("0_512").unwrap(), 0);
        assert!(matches!(
            tiles.resolve_search("9_9"),
            Err(TileError::NotFound { .. })
        ));
    }

    #[test]
    fn test_annotation_filename() {
        assert_eq!(annotation_filename("tile_0_0.png"), "tile_0_0_points.csv");
        assert_eq!(annotation_filename("noext"), "noext_points.csv");
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let opt = TempDir::new().unwrap();
        let missing = opt.path().join("nope");
        assert!(matches!(
            TileSet::scan(opt.path(), &missing),
            Err(TileError::Io(_))
        ));
    }
}
