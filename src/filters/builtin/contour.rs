use std::sync::Arc;

use crate::analysis::ContourAnalyzer;
use crate::frame::Frame;

use super::super::ImageFilter;

/// Submits each frame to the contour analyzer and passes the image through
/// unchanged. Detection results arrive out-of-band on the analyzer's
/// listener; this filter never blocks the frame cadence.
pub struct ContourFilter {
    analyzer: Arc<ContourAnalyzer>,
}

impl ContourFilter {
    pub fn new(analyzer: Arc<ContourAnalyzer>) -> Self {
        Self { analyzer }
    }
}

impl ImageFilter for ContourFilter {
    fn name(&self) -> &str {
        "Contour detecting"
    }

    fn apply(&self, frame: Frame) -> Frame {
        self.analyzer.analyze(&frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detector::ThresholdContourDetector;
    use crate::analysis::Orientation;

    #[test]
    fn test_contour_filter_passes_frame_through() {
        let analyzer = Arc::new(ContourAnalyzer::new(
            ThresholdContourDetector::default(),
            Orientation::Up,
        ));
        let filter = ContourFilter::new(analyzer);

        let frame = Frame::new(vec![64; Frame::expected_size(8, 8)], 8, 8, 11);
        let out = filter.apply(frame);
        assert_eq!(out.frame_number, 11);
        assert!(out.data.iter().all(|&b| b == 64));
    }
}
