use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::PointerEvent;

/// Size of the rendered area in pixels, used to normalize pointer positions.
///
/// Starts at `0 × 0`; hosts are expected to call
/// [`PickingRouter::set_dimensions`](crate::PickingRouter::set_dimensions)
/// before the first pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportDimensions {
    pub width: f32,
    pub height: f32,
}

impl ViewportDimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Maps a pointer event into normalized device coordinates.
    ///
    /// The result is not clamped; a zero-sized viewport yields non-finite
    /// components rather than a panic.
    pub fn to_ndc(&self, event: &PointerEvent, rect: &SurfaceRect, depth: f32) -> Vec3 {
        Vec3::new(
            (event.client_x - rect.left) / self.width * 2.0 - 1.0,
            -(event.client_y - rect.top) / self.height * 2.0 + 1.0,
            depth,
        )
    }
}

/// Bounding box of the render surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> ViewportDimensions {
        ViewportDimensions::new(self.width, self.height)
    }
}
