//! Contracts the core expects the host UI to fulfil.
//!
//! The core never owns widgets or dialogs. It asks the host for the few
//! things it cannot do itself: resolving the unsaved-changes prompt and
//! reporting an image's pixel dimensions. In return it hands the host plain
//! [`RenderState`] values to draw; surfaces never query the session or each
//! other.

use std::path::Path;

use crate::correspondence::Point;
use crate::transform::Transform;

/// Outcome of the modal unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    /// Save the current set, then continue.
    Save,
    /// Continue without saving.
    Discard,
    /// Abort the navigation.
    Cancel,
}

/// Modal confirmation shown before navigating away from unsaved changes.
pub trait UnsavedPrompt {
    fn resolve(&mut self) -> UnsavedChoice;
}

/// Reports an image file's pixel dimensions.
pub trait ImageProbe {
    fn dimensions(&self, path: &Path) -> std::io::Result<(u32, u32)>;
}

/// [`ImageProbe`] backed by the `image` crate's header-only dimension read.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageProbe;

impl ImageProbe for FsImageProbe {
    fn dimensions(&self, path: &Path) -> std::io::Result<(u32, u32)> {
        image::image_dimensions(path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// One point marker for the host surface to draw, in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Positional 1-based number of the point on its side; a pending
    /// unmatched point gets the next number.
    pub id: usize,
    pub position: Point,
}

/// Everything a display surface needs to redraw one view.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Scale and pan to apply to the bitmap.
    pub transform: Transform,
    /// Markers to overlay, already filtered for the session mode.
    pub markers: Vec<Marker>,
}
