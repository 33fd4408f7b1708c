//! Camera Filters - live capture and image-filtering pipeline
//!
//! Pulls frames from a camera device, applies the selected filter, and
//! hands display-ready images to a render surface while an asynchronous
//! contour analyzer keeps a detection overlay in sync with the live
//! frame. The render surface, UI chrome and platform dialogs are external
//! collaborators behind small traits.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod filters;
pub mod frame;
pub mod geometry;
pub mod pipeline;
pub mod surface;

pub use analysis::ContourAnalyzer;
pub use capture::CaptureSession;
pub use config::PipelineConfig;
pub use filters::FilterCatalog;
pub use frame::Frame;
pub use geometry::Viewport;
pub use pipeline::FramePipeline;
pub use surface::RenderMailbox;
