//! Paired-view zoom and pan synchronization.
//!
//! The two tile views are independently scrollable, but the operator expects
//! them to stay coupled: zooming either view applies the same scale to both,
//! and dragging one view scrolls the other by the same device-space delta.
//! All view state lives here as plain values; display surfaces receive a
//! [`Transform`] to render and never query each other.

use crate::transform::{DevicePoint, Transform};

/// Which of the two paired views an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSide {
    /// The optical tile view.
    Left,
    /// The radar tile view.
    Right,
}

impl ViewSide {
    /// The opposite side.
    pub fn other(self) -> ViewSide {
        match self {
            ViewSide::Left => ViewSide::Right,
            ViewSide::Right => ViewSide::Left,
        }
    }
}

/// Pan/zoom state of one view plus the dimensions of the image bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub transform: Transform,
    /// Pixel dimensions of the bound image, if one is loaded.
    pub image_size: Option<(u32, u32)>,
}

impl ViewState {
    /// True if the given image-space position lies inside the bound image.
    pub fn contains_image_point(&self, x: f32, y: f32) -> bool {
        match self.image_size {
            Some((w, h)) => x >= 0.0 && x < w as f32 && y >= 0.0 && y < h as f32,
            None => false,
        }
    }
}

/// Keeps the two paired views' zoom level and scroll position coupled.
#[derive(Debug, Clone, Default)]
pub struct ViewSync {
    left: ViewState,
    right: ViewState,
}

impl ViewSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self, side: ViewSide) -> &ViewState {
        match side {
            ViewSide::Left => &self.left,
            ViewSide::Right => &self.right,
        }
    }

    fn view_mut(&mut self, side: ViewSide) -> &mut ViewState {
        match side {
            ViewSide::Left => &mut self.left,
            ViewSide::Right => &mut self.right,
        }
    }

    /// Bind image dimensions to one side (on tile load).
    pub fn bind_image(&mut self, side: ViewSide, width: u32, height: u32) {
        self.view_mut(side).image_size = Some((width, height));
    }

    /// Reset both views to identity (tile navigation).
    pub fn reset(&mut self) {
        self.left = ViewState::default();
        self.right = ViewState::default();
    }

    /// Zoom `side` keeping `anchor` fixed, then propagate the new scale to
    /// the paired view.
    ///
    /// The paired view recomputes its pan against its own current
    /// anchor-equivalent point, so both views end up at the same scale but
    /// may still show different regions if they were panned apart before.
    /// Does nothing to the pair when it has no image loaded.
    pub fn on_zoom(&mut self, side: ViewSide, factor: f32, anchor: DevicePoint) {
        let zoomed = self.view(side).transform.zoom_at(anchor, factor);
        self.view_mut(side).transform = zoomed;

        let paired = self.view_mut(side.other());
        if paired.image_size.is_some() {
            // Same anchor in the paired view's own coordinate frame.
            let (img_x, img_y) = paired.transform.to_image(anchor);
            paired.transform = Transform {
                scale: zoomed.scale,
                pan_x: img_x * zoomed.scale - anchor.x,
                pan_y: img_y * zoomed.scale - anchor.y,
            };
        }
    }

    /// Pan `side` by a device-space delta and mirror the identical delta onto
    /// the paired view (scrollbar coupling, not image-space coupling).
    pub fn on_pan(&mut self, side: ViewSide, dx: f32, dy: f32) {
        let view = self.view_mut(side);
        view.transform = view.transform.pan_by(dx, dy);

        let paired = self.view_mut(side.other());
        if paired.image_size.is_some() {
            paired.transform = paired.transform.pan_by(dx, dy);
        }
    }
}
