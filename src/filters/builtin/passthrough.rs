use crate::frame::Frame;

use super::super::ImageFilter;

/// The identity filter.
pub struct PassthroughFilter;

impl ImageFilter for PassthroughFilter {
    fn name(&self) -> &str {
        "None"
    }

    fn apply(&self, frame: Frame) -> Frame {
        frame
    }
}
