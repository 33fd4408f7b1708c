//! Built-in contour detection backend.
//!
//! Threshold-based extraction: downscale to a bounded working size,
//! grayscale, binarize (Otsu by default), then trace contours. The
//! largest contour is reported as a normalized path together with the
//! total contour count.

use glam::Vec2;
use image::{imageops, GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::contrast::otsu_level;

use crate::error::AnalysisError;
use crate::frame::Frame;

use super::{ContourDetector, Detection, Orientation};

/// Longest working-image side used for detection.
pub const DEFAULT_MAX_DIMENSION: u32 = 300;

/// CPU contour detector over a binarized, downscaled copy of the frame.
pub struct ThresholdContourDetector {
    max_dimension: u32,
    /// Fixed binarization level; `None` picks one per frame with Otsu.
    threshold: Option<u8>,
}

impl ThresholdContourDetector {
    pub fn new(max_dimension: u32, threshold: Option<u8>) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            threshold,
        }
    }
}

impl Default for ThresholdContourDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION, None)
    }
}

impl ContourDetector for ThresholdContourDetector {
    fn detect(&mut self, frame: &Frame, orientation: Orientation) -> Result<Detection, AnalysisError> {
        if frame.data.is_empty() || !frame.is_valid() {
            return Err(AnalysisError::EmptyInput);
        }
        let rgba = frame.to_rgba().ok_or(AnalysisError::EmptyInput)?;

        let (width, height) = (rgba.width(), rgba.height());
        let longest = width.max(height);
        let (working, work_w, work_h) = if longest > self.max_dimension {
            let scale = self.max_dimension as f32 / longest as f32;
            let work_w = ((width as f32 * scale).round() as u32).max(1);
            let work_h = ((height as f32 * scale).round() as u32).max(1);
            (
                imageops::resize(&rgba, work_w, work_h, imageops::FilterType::Triangle),
                work_w,
                work_h,
            )
        } else {
            (rgba, width, height)
        };

        let gray: GrayImage = imageops::grayscale(&working);
        let level = self.threshold.unwrap_or_else(|| otsu_level(&gray));
        let binary = GrayImage::from_fn(work_w, work_h, |x, y| {
            if gray.get_pixel(x, y)[0] > level {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });

        let contours = find_contours::<i32>(&binary);
        let contour_count = contours.len();

        let path = contours
            .into_iter()
            .max_by_key(|c| c.points.len())
            .map(|contour| {
                contour
                    .points
                    .iter()
                    .map(|p| {
                        orient(
                            Vec2::new(p.x as f32 / work_w as f32, p.y as f32 / work_h as f32),
                            orientation,
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Detection { path, contour_count })
    }
}

fn orient(point: Vec2, orientation: Orientation) -> Vec2 {
    match orientation {
        Orientation::Up => point,
        Orientation::RightMirrored => Vec2::new(point.y, point.x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Black frame with a white axis-aligned rectangle.
    fn frame_with_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Frame {
        let mut data = vec![0u8; Frame::expected_size(width, height)];
        for y in 0..height {
            for x in 0..width {
                let idx = ((y * width + x) * 4) as usize;
                data[idx + 3] = 255;
                if x >= x0 && x < x1 && y >= y0 && y < y1 {
                    data[idx] = 255;
                    data[idx + 1] = 255;
                    data[idx + 2] = 255;
                }
            }
        }
        Frame::new(data, width, height, 0)
    }

    fn bounds(path: &[Vec2]) -> (Vec2, Vec2) {
        let mut min = path[0];
        let mut max = path[0];
        for p in path {
            min = min.min(*p);
            max = max.max(*p);
        }
        (min, max)
    }

    #[test]
    fn test_detects_square_in_normalized_coordinates() {
        let frame = frame_with_rect(100, 100, 20, 30, 60, 70);
        let mut detector = ThresholdContourDetector::new(300, Some(128));

        let detection = detector.detect(&frame, Orientation::Up).unwrap();
        assert!(detection.contour_count >= 1);
        assert!(!detection.path.is_empty());
        assert!(detection
            .path
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));

        let (min, max) = bounds(&detection.path);
        assert!((min.x - 0.20).abs() < 0.05);
        assert!((max.x - 0.60).abs() < 0.05);
        assert!((min.y - 0.30).abs() < 0.05);
        assert!((max.y - 0.70).abs() < 0.05);
    }

    #[test]
    fn test_right_mirrored_transposes_path() {
        let frame = frame_with_rect(100, 100, 20, 30, 60, 70);
        let mut detector = ThresholdContourDetector::new(300, Some(128));

        let detection = detector.detect(&frame, Orientation::RightMirrored).unwrap();
        let (min, max) = bounds(&detection.path);
        assert!((min.x - 0.30).abs() < 0.05);
        assert!((max.x - 0.70).abs() < 0.05);
        assert!((min.y - 0.20).abs() < 0.05);
        assert!((max.y - 0.60).abs() < 0.05);
    }

    #[test]
    fn test_large_frame_is_downscaled_before_detection() {
        let frame = frame_with_rect(600, 400, 120, 80, 360, 240);
        let mut detector = ThresholdContourDetector::default();

        let detection = detector.detect(&frame, Orientation::Up).unwrap();
        assert!(detection.contour_count >= 1);
        let (min, max) = bounds(&detection.path);
        assert!((min.x - 0.20).abs() < 0.05);
        assert!((max.x - 0.60).abs() < 0.05);
        assert!((min.y - 0.20).abs() < 0.05);
        assert!((max.y - 0.60).abs() < 0.05);
    }

    #[test]
    fn test_blank_frame_reports_no_contours() {
        let frame = frame_with_rect(64, 64, 0, 0, 0, 0);
        let mut detector = ThresholdContourDetector::new(300, Some(128));

        let detection = detector.detect(&frame, Orientation::Up).unwrap();
        assert_eq!(detection.contour_count, 0);
        assert!(detection.path.is_empty());
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let frame = Frame::new(Vec::new(), 4, 4, 0);
        let mut detector = ThresholdContourDetector::default();
        assert!(matches!(
            detector.detect(&frame, Orientation::Up),
            Err(AnalysisError::EmptyInput)
        ));
    }
}
