//! Frame filters.
//!
//! Each filter is a named, pure `Frame -> Frame` transform. Filters are
//! registered in a [`FilterCatalog`] and selected by name; the pipeline
//! applies whichever entry is active when a frame arrives.

pub mod builtin;
pub mod catalog;

pub use catalog::FilterCatalog;

use crate::frame::Frame;

/// A named frame transform.
///
/// `apply` may be expensive (blur, detection submission) and may return a
/// frame with an expanded extent; the pipeline crops the result back to
/// the source extent. No caching happens at this layer.
pub trait ImageFilter: Send + Sync {
    /// Unique, human-readable name. The only identity a filter has.
    fn name(&self) -> &str;

    /// Transform one frame.
    fn apply(&self, frame: Frame) -> Frame;
}
