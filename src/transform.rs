//! Device/image coordinate mathematics.
//!
//! This module contains the pure math for converting between on-screen device
//! coordinates and original-image pixel coordinates under a scale factor and
//! pan offset, extracted for testability and reusability.

/// Minimum allowed scale factor.
pub const MIN_SCALE: f32 = 0.1;
/// Maximum allowed scale factor.
pub const MAX_SCALE: f32 = 10.0;

/// A position in device (widget) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePoint {
    pub x: f32,
    pub y: f32,
}

impl DevicePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Represents the pan/zoom transform of one view.
///
/// `to_device` and `to_image` are exact inverses of each other; annotation
/// coordinates are always stored in image space so they never depend on the
/// current scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Transform {
    /// Create a new transform with the given scale and pan.
    pub fn new(scale: f32, pan_x: f32, pan_y: f32) -> Self {
        Self {
            scale,
            pan_x,
            pan_y,
        }
    }

    /// Create an identity transform (scale=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Map an image-space position to device space.
    pub fn to_device(&self, image_x: f32, image_y: f32) -> DevicePoint {
        DevicePoint::new(
            image_x * self.scale - self.pan_x,
            image_y * self.scale - self.pan_y,
        )
    }

    /// Map a device-space position back to image space.
    pub fn to_image(&self, device: DevicePoint) -> (f32, f32) {
        (
            (device.x + self.pan_x) / self.scale,
            (device.y + self.pan_y) / self.scale,
        )
    }

    /// Calculate zoom-to-cursor transformation.
    ///
    /// The image point under `anchor` before the zoom stays under `anchor`
    /// after it. The new scale is clamped to `[MIN_SCALE, MAX_SCALE]` rather
    /// than rejected, so there is no error path.
    pub fn zoom_at(&self, anchor: DevicePoint, factor: f32) -> Transform {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);

        // Image-space point under the anchor (before zoom)
        let (img_x, img_y) = self.to_image(anchor);

        // New pan keeps that image point at the anchor position
        Transform {
            scale: new_scale,
            pan_x: img_x * new_scale - anchor.x,
            pan_y: img_y * new_scale - anchor.y,
        }
    }

    /// Apply a pan delta in device space.
    pub fn pan_by(&self, dx: f32, dy: f32) -> Transform {
        Transform {
            scale: self.scale,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
