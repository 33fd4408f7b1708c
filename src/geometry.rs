//! Display-space geometry.
//!
//! Pure mapping between sensor-space extents, normalized detection paths
//! and viewport pixels. Nothing here touches shared state; the viewport is
//! always passed in by whoever owns the render surface.

use glam::{Affine2, Vec2};

use crate::frame::SensorExtent;

/// Size of the current render target in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Uniform scale factor that fills `viewport` from `extent`.
///
/// `max` of the per-axis ratios: the target is fully covered, overflow on
/// the other axis is cropped, never letterboxed and never stretched.
/// Callers must reject degenerate extents first.
pub fn fill_scale(extent: &SensorExtent, viewport: Viewport) -> f32 {
    let scale_x = viewport.width / extent.width as f32;
    let scale_y = viewport.height / extent.height as f32;
    scale_x.max(scale_y)
}

/// Scale-to-fill transform for an image extent.
///
/// Translates the extent origin to (0, 0), then applies [`fill_scale`]
/// uniformly to both axes. The result is origin-anchored: overflow hangs
/// off the far edges of the viewport.
pub fn scale_to_fill(extent: &SensorExtent, viewport: Viewport) -> Affine2 {
    let scale = fill_scale(extent, viewport);
    Affine2::from_scale(Vec2::splat(scale))
        * Affine2::from_translation(-Vec2::new(extent.origin_x, extent.origin_y))
}

/// Map a normalized detection path into viewport pixels.
///
/// The path's bounding box is scaled to the viewport with *independent*
/// X and Y factors, then centered. These factors may disagree with each
/// other and with [`scale_to_fill`]'s uniform factor; the overlay and the
/// underlying image therefore drift apart under non-square aspect
/// mismatches. That behavior is intentional and pinned by tests.
///
/// A path whose bounding box has zero width or height maps to nothing.
pub fn normalized_path_to_viewport(path: &[Vec2], viewport: Viewport) -> Vec<Vec2> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut min = path[0];
    let mut max = path[0];
    for point in &path[1..] {
        min = min.min(*point);
        max = max.max(*point);
    }
    let box_size = max - min;
    if box_size.x <= 0.0 || box_size.y <= 0.0 {
        return Vec::new();
    }

    let scale_x = viewport.width / box_size.x;
    let scale_y = viewport.height / box_size.y;
    let tx = (viewport.width - box_size.x * scale_x) / 2.0;
    let ty = (viewport.height - box_size.y * scale_y) / 2.0;

    path.iter()
        .map(|p| Vec2::new(p.x * scale_x + tx, p.y * scale_y + ty))
        .collect()
}
