use image::RgbaImage;

use crate::frame::{Frame, SensorExtent};

use super::super::ImageFilter;

/// Gaussian blur.
///
/// The output extent grows by the kernel support on every side, with the
/// origin shifted accordingly; the pipeline crops back to the source
/// extent afterwards.
pub struct GaussianBlurFilter {
    sigma: f32,
}

impl GaussianBlurFilter {
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }

    /// Pixels of padding needed to hold the kernel support.
    fn padding(&self) -> u32 {
        (3.0 * self.sigma).ceil() as u32
    }
}

impl Default for GaussianBlurFilter {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl ImageFilter for GaussianBlurFilter {
    fn name(&self) -> &str {
        "Gaussian blur"
    }

    fn apply(&self, frame: Frame) -> Frame {
        if frame.extent.is_degenerate() {
            return frame;
        }
        let Some(image) = frame.to_rgba() else {
            return frame;
        };

        let pad = self.padding();
        let (width, height) = (image.width(), image.height());

        // Edge-replicated padding so the blur has pixels to pull from
        // beyond the source bounds.
        let padded = RgbaImage::from_fn(width + 2 * pad, height + 2 * pad, |x, y| {
            let sx = x.saturating_sub(pad).min(width - 1);
            let sy = y.saturating_sub(pad).min(height - 1);
            *image.get_pixel(sx, sy)
        });

        let blurred = image::imageops::blur(&padded, self.sigma);

        let extent = SensorExtent::new(
            frame.extent.origin_x - pad as f32,
            frame.extent.origin_y - pad as f32,
            width + 2 * pad,
            height + 2 * pad,
        );
        Frame::from_rgba(blurred, extent, frame.frame_number, frame.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_expands_extent() {
        let frame = Frame::new(vec![128; Frame::expected_size(16, 16)], 16, 16, 2);
        let filter = GaussianBlurFilter::new(2.0);
        let pad = filter.padding();

        let out = filter.apply(frame);
        assert_eq!(out.extent.width, 16 + 2 * pad);
        assert_eq!(out.extent.height, 16 + 2 * pad);
        assert_eq!(out.extent.origin_x, -(pad as f32));
        assert_eq!(out.extent.origin_y, -(pad as f32));
        assert!(out.is_valid());
        assert_eq!(out.frame_number, 2);
    }

    #[test]
    fn test_blur_then_crop_restores_source_extent() {
        let frame = Frame::new(vec![200; Frame::expected_size(16, 16)], 16, 16, 0);
        let source = frame.extent;

        let blurred = GaussianBlurFilter::default().apply(frame);
        let restored = blurred.cropped_to(&source);
        assert_eq!(restored.extent, source);
        assert!(restored.is_valid());
        // A constant image blurred with replicated edges stays constant.
        assert!(restored.data.chunks_exact(4).all(|p| p[0] >= 198));
    }
}
