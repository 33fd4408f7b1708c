//! Frame buffer representation.
//!
//! A [`Frame`] is an immutable RGBA image tagged with its sensor-space
//! extent. Frames are produced once per capture callback and consumed by
//! exactly one pipeline pass.

use std::time::Instant;

use image::RgbaImage;

/// Pixel extent in sensor space.
///
/// The origin is allowed to move off (0, 0): filters that enlarge their
/// output (blur padding) report the expansion through a negative origin
/// shift, and the pipeline crops back to the source extent afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorExtent {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: u32,
    pub height: u32,
}

impl SensorExtent {
    /// Extent anchored at the sensor origin.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width,
            height,
        }
    }

    pub fn new(origin_x: f32, origin_y: f32, width: u32, height: u32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Zero-area extents must never reach a filter or the scaling math.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A single captured (or filtered) RGBA frame.
#[derive(Clone)]
pub struct Frame {
    /// Raw RGBA pixel data, row-major, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Sensor-space extent of the pixel data.
    pub extent: SensorExtent,
    /// Monotonic frame number assigned by the capture thread.
    pub frame_number: u64,
    /// Capture timestamp.
    pub timestamp: Instant,
}

impl Frame {
    /// Create a frame anchored at the sensor origin.
    pub fn new(data: Vec<u8>, width: u32, height: u32, frame_number: u64) -> Self {
        Self {
            data,
            extent: SensorExtent::with_size(width, height),
            frame_number,
            timestamp: Instant::now(),
        }
    }

    /// Expected data size for the given dimensions (width * height * 4).
    pub fn expected_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    /// Check that the pixel data matches the extent.
    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::expected_size(self.extent.width, self.extent.height)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.extent.width as usize * 4
    }

    /// View the pixel data as an [`RgbaImage`], cloning the buffer.
    ///
    /// Returns `None` when the data length does not match the extent.
    pub fn to_rgba(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.extent.width, self.extent.height, self.data.clone())
    }

    /// Rebuild a frame from an [`RgbaImage`], keeping identity metadata.
    pub fn from_rgba(image: RgbaImage, extent: SensorExtent, frame_number: u64, timestamp: Instant) -> Self {
        debug_assert_eq!(image.width(), extent.width);
        debug_assert_eq!(image.height(), extent.height);
        Self {
            data: image.into_raw(),
            extent,
            frame_number,
            timestamp,
        }
    }

    /// Crop the frame back to `target`, clamped to the available pixels.
    ///
    /// Used by the pipeline to restore a filter's output to the source
    /// extent before any display geometry is applied. A frame that already
    /// matches `target` is returned unchanged.
    pub fn cropped_to(self, target: &SensorExtent) -> Frame {
        if self.extent == *target {
            return self;
        }

        let Some(image) = RgbaImage::from_raw(self.extent.width, self.extent.height, self.data)
        else {
            // Inconsistent buffer; nothing sensible to crop.
            return Frame {
                data: Vec::new(),
                extent: SensorExtent::with_size(0, 0),
                frame_number: self.frame_number,
                timestamp: self.timestamp,
            };
        };

        let dx = (target.origin_x - self.extent.origin_x).round().max(0.0) as u32;
        let dy = (target.origin_y - self.extent.origin_y).round().max(0.0) as u32;
        let width = target.width.min(self.extent.width.saturating_sub(dx));
        let height = target.height.min(self.extent.height.saturating_sub(dy));

        let cropped = image::imageops::crop_imm(&image, dx, dy, width, height).to_image();
        let extent = SensorExtent::new(target.origin_x, target.origin_y, width, height);
        Frame::from_rgba(cropped, extent, self.frame_number, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(vec![value; Frame::expected_size(width, height)], width, height, 0)
    }

    #[test]
    fn test_frame_creation() {
        let frame = solid_frame(1920, 1080, 0);
        assert_eq!(frame.extent.width, 1920);
        assert_eq!(frame.extent.height, 1080);
        assert!(frame.is_valid());
        assert_eq!(frame.stride(), 1920 * 4);
        assert!(!frame.extent.is_degenerate());
    }

    #[test]
    fn test_degenerate_extent() {
        assert!(SensorExtent::with_size(0, 1080).is_degenerate());
        assert!(SensorExtent::with_size(1920, 0).is_degenerate());
        assert!(!SensorExtent::with_size(1, 1).is_degenerate());
    }

    #[test]
    fn test_crop_identity() {
        let frame = solid_frame(64, 48, 7);
        let extent = frame.extent;
        let cropped = frame.cropped_to(&extent);
        assert_eq!(cropped.extent, extent);
        assert!(cropped.is_valid());
    }

    #[test]
    fn test_crop_expanded_back_to_source() {
        // Simulate a filter that padded the frame by 8px on every side.
        let source = SensorExtent::with_size(32, 32);
        let padded = Frame {
            data: vec![3; Frame::expected_size(48, 48)],
            extent: SensorExtent::new(-8.0, -8.0, 48, 48),
            frame_number: 5,
            timestamp: Instant::now(),
        };

        let restored = padded.cropped_to(&source);
        assert_eq!(restored.extent, source);
        assert!(restored.is_valid());
        assert_eq!(restored.frame_number, 5);
    }

    #[test]
    fn test_crop_clamps_to_available_pixels() {
        let frame = solid_frame(16, 16, 1);
        let target = SensorExtent::new(8.0, 8.0, 32, 32);
        let cropped = frame.cropped_to(&target);
        assert_eq!(cropped.extent.width, 8);
        assert_eq!(cropped.extent.height, 8);
        assert!(cropped.is_valid());
    }
}
