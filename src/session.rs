//! The annotation session state machine.
//!
//! [`AnnotationSession`] owns everything about the active tile: the
//! correspondence store, the paired view state, the review cursor, and the
//! unsaved-change snapshot. All user input funnels through it synchronously;
//! display surfaces only ever receive derived [`RenderState`] values.
//!
//! # States
//!
//! - **Idle**: no tile loaded; only `load_tiles` leads out.
//! - **Editing**: clicks append points in turn order, Ctrl+Z undoes.
//! - **Checking**: read-only cursor over the completed pairs; the current
//!   pair can be deleted.
//!
//! Navigation away from a tile with unsaved changes goes through an injected
//! [`UnsavedPrompt`]. Dirtiness is a value comparison against the last-saved
//! snapshot, not a boolean flag, so adding a point and undoing it does not
//! trigger a false prompt.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::correspondence::{CorrespondenceStore, Point, Snapshot};
use crate::host::{FsImageProbe, ImageProbe, Marker, RenderState, UnsavedChoice, UnsavedPrompt};
use crate::points_csv::{self, CsvError};
use crate::tiles::{self, TileError, TileSet};
use crate::transform::DevicePoint;
use crate::view_sync::{ViewSide, ViewSync};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No tile loaded.
    #[default]
    Idle,
    /// Normal point placement.
    Editing,
    /// Read-only pair review.
    Checking,
}

/// Actions reachable from the keyboard surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    NextTile,
    PrevTile,
    Save,
    Undo,
}

/// Enablement of the check-mode controls, derived from the cursor and pair
/// count so it can never drift out of sync with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckControls {
    pub next_enabled: bool,
    pub prev_enabled: bool,
    pub delete_enabled: bool,
}

/// Errors surfaced by session operations.
///
/// None of these terminate the session; the tile list and the current store
/// survive every error path.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Save requested before a save directory was chosen
    #[error("no save directory set")]
    MissingSaveDirectory,

    /// Annotation CSV save/load failure
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// Tile-set scan or search failure
    #[error(transparent)]
    Tiles(#[from] TileError),

    /// Filesystem failure outside CSV handling (e.g. probing image headers)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level orchestrator for one annotation session.
pub struct AnnotationSession {
    probe: Box<dyn ImageProbe>,
    tiles: TileSet,
    current_index: usize,
    save_dir: Option<PathBuf>,
    store: CorrespondenceStore,
    saved: Snapshot,
    views: ViewSync,
    mode: Mode,
    check_cursor: usize,
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationSession {
    /// Create an idle session probing image dimensions from the filesystem.
    pub fn new() -> Self {
        Self::with_probe(Box::new(FsImageProbe))
    }

    /// Create an idle session with an injected image probe.
    pub fn with_probe(probe: Box<dyn ImageProbe>) -> Self {
        Self {
            probe,
            tiles: TileSet::default(),
            current_index: 0,
            save_dir: None,
            store: CorrespondenceStore::new(),
            saved: Snapshot::default(),
            views: ViewSync::new(),
            mode: Mode::Idle,
            check_cursor: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn store(&self) -> &CorrespondenceStore {
        &self.store
    }

    pub fn views(&self) -> &ViewSync {
        &self.views
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Filename of the active tile, if one is loaded.
    pub fn current_tile_name(&self) -> Option<&str> {
        match self.mode {
            Mode::Idle => None,
            _ => self.tiles.name(self.current_index),
        }
    }

    pub fn save_dir(&self) -> Option<&Path> {
        self.save_dir.as_deref()
    }

    pub fn set_save_dir(&mut self, dir: PathBuf) {
        self.save_dir = Some(dir);
    }

    /// True when the store differs by value from the last-saved snapshot.
    pub fn is_dirty(&self) -> bool {
        !self.store.matches(&self.saved)
    }

    // ------------------------------------------------------------------
    // Tile loading and navigation
    // ------------------------------------------------------------------

    /// Scan the two source directories and load the first tile.
    ///
    /// The previous tile set is replaced unconditionally; an empty
    /// intersection leaves the session Idle with nothing loaded.
    pub fn load_tiles(&mut self, optical_dir: &Path, radar_dir: &Path) -> Result<(), SessionError> {
        self.tiles = TileSet::scan(optical_dir, radar_dir)?;
        self.current_index = 0;
        self.store = CorrespondenceStore::new();
        self.saved = self.store.snapshot();
        self.views.reset();
        self.mode = Mode::Idle;
        self.check_cursor = 0;

        if self.tiles.is_empty() {
            log::warn!("No shared tiles between {:?} and {:?}", optical_dir, radar_dir);
            return Ok(());
        }
        self.load_tile_at(0)
    }

    /// Load the tile at `index`.
    ///
    /// Probes both image halves before committing anything, so a filesystem
    /// failure leaves the session on the previous tile with its points
    /// intact. On success: resets both views, clears the store, then
    /// repopulates it from the tile's annotation file when one exists. A
    /// malformed annotation file is surfaced, leaving the tile loaded with
    /// an empty set.
    fn load_tile_at(&mut self, index: usize) -> Result<(), SessionError> {
        let Some(name) = self.tiles.name(index).map(str::to_owned) else {
            return Ok(());
        };

        let (opt_w, opt_h) = self.probe.dimensions(&self.tiles.optical_path(&name))?;
        let (sar_w, sar_h) = self.probe.dimensions(&self.tiles.radar_path(&name))?;

        self.current_index = index;
        self.views.reset();
        self.views.bind_image(ViewSide::Left, opt_w, opt_h);
        self.views.bind_image(ViewSide::Right, sar_w, sar_h);
        self.store = CorrespondenceStore::new();
        self.saved = self.store.snapshot();
        self.mode = Mode::Editing;
        self.check_cursor = 0;

        if let Some(dir) = &self.save_dir {
            let csv_path = dir.join(tiles::annotation_filename(&name));
            if csv_path.exists() {
                // All-or-nothing: on failure the tile stays loaded, empty.
                let pairs = points_csv::load(&csv_path)?;
                self.store = CorrespondenceStore::from_pairs(pairs);
                self.saved = self.store.snapshot();
            }
        }

        log::info!("Loaded tile {} ({}x{})", name, opt_w, opt_h);
        Ok(())
    }

    /// Navigate to the next tile, through the unsaved-changes guard.
    pub fn next_tile(&mut self, prompt: &mut dyn UnsavedPrompt) -> Result<(), SessionError> {
        if self.mode == Mode::Idle || self.current_index + 1 >= self.tiles.len() {
            return Ok(());
        }
        if !self.confirm_leave(prompt)? {
            return Ok(());
        }
        self.load_tile_at(self.current_index + 1)
    }

    /// Navigate to the previous tile, through the unsaved-changes guard.
    pub fn prev_tile(&mut self, prompt: &mut dyn UnsavedPrompt) -> Result<(), SessionError> {
        if self.mode == Mode::Idle || self.current_index == 0 {
            return Ok(());
        }
        if !self.confirm_leave(prompt)? {
            return Ok(());
        }
        self.load_tile_at(self.current_index - 1)
    }

    /// Jump to the tile named by a bare `"X_Y"` search token.
    ///
    /// Goes through the same unsaved-changes guard as next/prev.
    pub fn search(
        &mut self,
        token: &str,
        prompt: &mut dyn UnsavedPrompt,
    ) -> Result<(), SessionError> {
        let index = self.tiles.resolve_search(token)?;
        if self.mode != Mode::Idle && index == self.current_index {
            return Ok(());
        }
        if self.mode != Mode::Idle && !self.confirm_leave(prompt)? {
            return Ok(());
        }
        self.load_tile_at(index)
    }

    /// Ask the prompt whether to leave a dirty tile. Returns false to abort.
    fn confirm_leave(&mut self, prompt: &mut dyn UnsavedPrompt) -> Result<bool, SessionError> {
        if !self.is_dirty() {
            return Ok(true);
        }
        match prompt.resolve() {
            UnsavedChoice::Save => {
                self.save()?;
                Ok(true)
            }
            UnsavedChoice::Discard => Ok(true),
            UnsavedChoice::Cancel => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the current set to `<stem>_points.csv` in the save directory.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let Some(name) = self.current_tile_name().map(str::to_owned) else {
            log::warn!("Save requested with no tile loaded");
            return Ok(());
        };
        let dir = self.save_dir.as_ref().ok_or(SessionError::MissingSaveDirectory)?;

        let path = dir.join(tiles::annotation_filename(&name));
        points_csv::save(
            &path,
            &format!("OPT/{name}"),
            &format!("SAR/{name}"),
            &self.store,
        )?;
        self.saved = self.store.snapshot();
        Ok(())
    }

    /// Replace the current set with pairs imported from an arbitrary CSV.
    ///
    /// The imported set counts as unsaved until written to this tile's own
    /// annotation file.
    pub fn import_points(&mut self, path: &Path) -> Result<(), SessionError> {
        if self.mode == Mode::Idle {
            return Ok(());
        }
        let pairs = points_csv::load(path)?;
        self.store = CorrespondenceStore::from_pairs(pairs);
        self.check_cursor = 0;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Handle a click on one view at a device-space position.
    ///
    /// Wrong-mode, wrong-turn and out-of-bounds clicks are silent no-ops.
    pub fn click(&mut self, side: ViewSide, device: DevicePoint) {
        if self.mode != Mode::Editing {
            return;
        }

        let view = self.views.view(side);
        let (img_x, img_y) = view.transform.to_image(device);
        if !view.contains_image_point(img_x, img_y) {
            log::debug!("Ignoring out-of-bounds click at ({img_x:.1}, {img_y:.1})");
            return;
        }

        let point = Point::new(img_x as i32, img_y as i32);
        let result = match side {
            ViewSide::Left => self.store.add_left(point),
            ViewSide::Right => self.store.add_right(point),
        };
        if result.is_err() {
            log::debug!("Ignoring click on {:?}: not its turn", side);
        }
    }

    /// Undo the most recent point (Ctrl+Z).
    pub fn undo(&mut self) {
        if self.mode == Mode::Editing {
            self.store.undo_last();
        }
    }

    /// Zoom one view (and its pair) around a device-space anchor.
    pub fn zoom(&mut self, side: ViewSide, factor: f32, anchor: DevicePoint) {
        if self.mode != Mode::Idle {
            self.views.on_zoom(side, factor, anchor);
        }
    }

    /// Pan one view (and its pair) by a device-space delta.
    pub fn pan(&mut self, side: ViewSide, dx: f32, dy: f32) {
        if self.mode != Mode::Idle {
            self.views.on_pan(side, dx, dy);
        }
    }

    // ------------------------------------------------------------------
    // Check mode
    // ------------------------------------------------------------------

    /// Toggle check mode. Independent of tile navigation, always allowed
    /// while a tile is loaded.
    pub fn toggle_check(&mut self) {
        self.mode = match self.mode {
            Mode::Idle => Mode::Idle,
            Mode::Editing => {
                self.check_cursor = 0;
                Mode::Checking
            }
            Mode::Checking => Mode::Editing,
        };
    }

    pub fn check_cursor(&self) -> usize {
        self.check_cursor
    }

    /// Control enablement derived from the cursor position and pair count.
    pub fn check_controls(&self) -> CheckControls {
        if self.mode != Mode::Checking {
            return CheckControls::default();
        }
        let count = self.store.pair_count();
        CheckControls {
            next_enabled: count > 0 && self.check_cursor + 1 < count,
            prev_enabled: count > 0 && self.check_cursor > 0,
            delete_enabled: count > 0,
        }
    }

    /// Advance the review cursor. No-op at the upper bound.
    pub fn check_next(&mut self) {
        if self.check_controls().next_enabled {
            self.check_cursor += 1;
        }
    }

    /// Step the review cursor back. No-op at zero.
    pub fn check_prev(&mut self) {
        if self.check_controls().prev_enabled {
            self.check_cursor -= 1;
        }
    }

    /// Delete the pair under the cursor, clamping the cursor afterwards.
    pub fn check_delete(&mut self) {
        if !self.check_controls().delete_enabled {
            return;
        }
        // Cursor is always within [0, pair_count) here.
        if self.store.delete_at(self.check_cursor).is_ok() {
            let count = self.store.pair_count();
            self.check_cursor = self.check_cursor.min(count.saturating_sub(1));
        }
    }

    // ------------------------------------------------------------------
    // Input dispatch and rendering
    // ------------------------------------------------------------------

    /// Dispatch a resolved keyboard action.
    pub fn handle_action(
        &mut self,
        action: SessionAction,
        prompt: &mut dyn UnsavedPrompt,
    ) -> Result<(), SessionError> {
        match action {
            SessionAction::NextTile => self.next_tile(prompt),
            SessionAction::PrevTile => self.prev_tile(prompt),
            SessionAction::Save => self.save(),
            SessionAction::Undo => {
                self.undo();
                Ok(())
            }
        }
    }

    /// Derive what one display surface should draw right now.
    pub fn render_state(&self, side: ViewSide) -> RenderState {
        let points = match side {
            ViewSide::Left => self.store.left_points(),
            ViewSide::Right => self.store.right_points(),
        };

        let markers = match self.mode {
            Mode::Idle => Vec::new(),
            Mode::Editing => points
                .iter()
                .enumerate()
                .map(|(i, &position)| Marker {
                    id: i + 1,
                    position,
                })
                .collect(),
            Mode::Checking => points
                .get(self.check_cursor)
                .map(|&position| Marker {
                    id: self.check_cursor + 1,
                    position,
                })
                .into_iter()
                .collect(),
        };

        RenderState {
            transform: self.views.view(side).transform,
            markers,
        }
    }
}
