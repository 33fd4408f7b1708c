//! Error types for the capture, filter, analysis and config seams.

use thiserror::Error;

/// Errors raised while configuring or running a capture session.
///
/// All of these are terminal for the session: the state machine moves to
/// `Failed` and stays there until `start_displaying` is invoked again.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no capture device available")]
    NoDevice,
    #[error("failed to open capture device: {0}")]
    OpenFailed(String),
    #[error("failed to start capture stream: {0}")]
    StreamFailed(String),
    #[error("failed to spawn capture thread: {0}")]
    ThreadSpawn(String),
}

/// Errors from filter catalog operations. Local and recoverable; the
/// active filter is never changed by a failed call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter: {0:?}")]
    UnknownFilter(String),
    #[error("filter catalog must contain at least one filter")]
    EmptyCatalog,
}

/// Errors from a contour detection pass. Isolated to the current cycle;
/// the analyzer logs and continues.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("contour detection failed: {0}")]
    DetectorFailed(String),
    #[error("analysis input frame is empty")]
    EmptyInput,
}

/// Errors loading or saving the pipeline configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
