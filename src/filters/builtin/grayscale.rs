use crate::frame::Frame;

use super::super::ImageFilter;

/// Tonal desaturation filter. Luma-weighted, alpha preserved.
pub struct GrayscaleFilter;

impl ImageFilter for GrayscaleFilter {
    fn name(&self) -> &str {
        "Gray color"
    }

    fn apply(&self, mut frame: Frame) -> Frame {
        for pixel in frame.data.chunks_exact_mut(4) {
            let luma = (0.2126 * pixel[0] as f32
                + 0.7152 * pixel[1] as f32
                + 0.0722 * pixel[2] as f32)
                .round()
                .clamp(0.0, 255.0) as u8;
            pixel[0] = luma;
            pixel[1] = luma;
            pixel[2] = luma;
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_equalizes_channels() {
        let mut data = vec![0u8; Frame::expected_size(2, 1)];
        data[0..4].copy_from_slice(&[200, 40, 90, 255]);
        data[4..8].copy_from_slice(&[10, 10, 10, 128]);
        let frame = Frame::new(data, 2, 1, 0);

        let out = GrayscaleFilter.apply(frame);
        assert_eq!(out.data[0], out.data[1]);
        assert_eq!(out.data[1], out.data[2]);
        assert_eq!(out.data[3], 255);
        assert_eq!(out.data[4..7], [10, 10, 10]);
        assert_eq!(out.data[7], 128);
    }

    #[test]
    fn test_grayscale_keeps_extent() {
        let frame = Frame::new(vec![50; Frame::expected_size(8, 8)], 8, 8, 3);
        let extent = frame.extent;
        let out = GrayscaleFilter.apply(frame);
        assert_eq!(out.extent, extent);
        assert_eq!(out.frame_number, 3);
    }
}
