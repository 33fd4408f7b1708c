//! Per-frame orchestration.
//!
//! Receives raw frames from the capture session, applies the active
//! filter, restores the source extent, rotates to display orientation and
//! scales to fill the viewport, then hands the finished image to the
//! render surface. Runs on the capture thread; everything it shares with
//! other threads is behind short-lived locks.

use std::sync::Weak;

use image::{imageops, RgbaImage};
use parking_lot::{Mutex, RwLock};

use crate::capture::SessionDelegate;
use crate::error::{CaptureError, FilterError};
use crate::filters::FilterCatalog;
use crate::frame::{Frame, SensorExtent};
use crate::geometry::{self, Viewport};
use crate::surface::{DisplayFrame, VideoSurface};

/// Orchestrates the capture-to-display path for every frame.
pub struct FramePipeline {
    catalog: RwLock<FilterCatalog>,
    viewport: Mutex<Viewport>,
    surface: Mutex<Option<Weak<dyn VideoSurface>>>,
}

impl FramePipeline {
    pub fn new(catalog: FilterCatalog, viewport: Viewport) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            viewport: Mutex::new(viewport),
            surface: Mutex::new(None),
        }
    }

    /// Register the render surface. Non-owning.
    pub fn set_surface(&self, surface: Weak<dyn VideoSurface>) {
        *self.surface.lock() = Some(surface);
    }

    /// Update the render target size. Takes effect on the next frame.
    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.lock() = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.lock()
    }

    /// Filter names in selection order.
    pub fn filter_names(&self) -> Vec<String> {
        self.catalog.read().names_in_order()
    }

    pub fn active_filter_name(&self) -> String {
        self.catalog.read().active_name().to_string()
    }

    /// Select the active filter by name, validating against the catalog.
    ///
    /// The switch is atomic with respect to frame processing and takes
    /// effect on the next frame; a frame already in flight keeps the
    /// filter that was active when it entered the pipeline.
    pub fn select_filter(&self, name: &str) -> Result<(), FilterError> {
        self.catalog.write().set_active(name)
    }

    fn surface(&self) -> Option<std::sync::Arc<dyn VideoSurface>> {
        self.surface.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Run one frame through filter, crop, rotation and fill scaling.
    pub fn process_frame(&self, frame: Frame) {
        if frame.extent.is_degenerate() {
            log::debug!("Skipping degenerate frame {}", frame.frame_number);
            return;
        }
        if !frame.is_valid() {
            log::warn!("Skipping frame {} with inconsistent buffer", frame.frame_number);
            return;
        }
        let viewport = self.viewport();
        if viewport.is_degenerate() {
            log::debug!("Skipping frame {}: degenerate viewport", frame.frame_number);
            return;
        }

        let source_extent = frame.extent;
        let frame_number = frame.frame_number;

        // Clone the active filter out of the catalog so no lock is held
        // while it runs.
        let filter = self.catalog.read().active_filter();
        let filtered = filter.apply(frame);

        // Filters may expand the extent; restore the source bounds before
        // any display geometry.
        let restored = filtered.cropped_to(&source_extent);
        if restored.extent.is_degenerate() || !restored.is_valid() {
            log::warn!(
                "Filter {:?} produced an unusable frame {}, dropping",
                filter.name(),
                frame_number
            );
            return;
        }
        let Some(image) = restored.to_rgba() else {
            return;
        };

        // Quarter-turn to display orientation, fixed by the sensor
        // mounting.
        let rotated = imageops::rotate270(&image);
        let rotated_extent = SensorExtent::with_size(rotated.width(), rotated.height());

        let display = fill_viewport(&rotated, &rotated_extent, viewport);
        let (width, height) = (display.width(), display.height());

        if let Some(surface) = self.surface() {
            surface.display(DisplayFrame {
                data: display.into_raw(),
                width,
                height,
                frame_number,
            });
        }
    }
}

impl SessionDelegate for FramePipeline {
    fn frame_ready(&self, frame: Frame) {
        self.process_frame(frame);
    }

    fn access_denied(&self) {
        if let Some(surface) = self.surface() {
            surface.access_denied();
        }
    }

    fn configuration_failed(&self, error: &CaptureError) {
        if let Some(surface) = self.surface() {
            surface.configuration_failed(&error.to_string());
        }
    }
}

/// Uniformly scale `image` to fill `viewport` and crop the overflow.
///
/// Origin-anchored: the covered axis matches the viewport exactly, the
/// other overflows past the far edge and is cropped.
fn fill_viewport(image: &RgbaImage, extent: &SensorExtent, viewport: Viewport) -> RgbaImage {
    let scale = geometry::fill_scale(extent, viewport);
    let scaled_w = ((extent.width as f32 * scale).round() as u32).max(1);
    let scaled_h = ((extent.height as f32 * scale).round() as u32).max(1);
    let resized = imageops::resize(image, scaled_w, scaled_h, imageops::FilterType::Triangle);

    let target_w = (viewport.width.round() as u32).clamp(1, scaled_w);
    let target_h = (viewport.height.round() as u32).clamp(1, scaled_h);
    imageops::crop_imm(&resized, 0, 0, target_w, target_h).to_image()
}
