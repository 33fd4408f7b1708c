//! Asynchronous contour analysis.
//!
//! The analyzer runs a detection backend on a dedicated worker thread,
//! decoupled from the capture cadence. Submissions are non-blocking and
//! may be dropped when the queue is full; completions are delivered to a
//! registered listener in completion order. The listener registration is
//! non-owning: the analyzer holds only a `Weak` reference, and the
//! listener's owner deregisters (or simply drops it) before teardown.

pub mod detector;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;
use parking_lot::Mutex;

use crate::error::AnalysisError;
use crate::frame::Frame;

/// Orientation hint handed to the detection backend.
///
/// Describes how the sensor image must be read so the normalized path
/// matches the rotation the display pipeline applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Up,
    RightMirrored,
}

/// Result of a single detection pass.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Largest detected contour in normalized [0,1]x[0,1] coordinates.
    pub path: Vec<Vec2>,
    /// Total number of contours found.
    pub contour_count: usize,
}

/// A detection delivered to the listener.
///
/// `request_seq` increases monotonically per submission. The default
/// overlay treats the most recently *delivered* update as authoritative;
/// a consumer that prefers submission-order freshness can discard updates
/// whose sequence is older than the last one it applied.
#[derive(Clone, Debug)]
pub struct DetectionUpdate {
    pub request_seq: u64,
    pub path: Vec<Vec2>,
    pub contour_count: usize,
}

/// Contour detection backend collaborator.
pub trait ContourDetector: Send {
    fn detect(&mut self, frame: &Frame, orientation: Orientation) -> Result<Detection, AnalysisError>;
}

/// Receiver for completed detections.
pub trait DetectionListener: Send + Sync {
    fn detection_ready(&self, update: DetectionUpdate);
}

struct AnalysisRequest {
    seq: u64,
    frame: Frame,
}

type ListenerSlot = Arc<Mutex<Option<Weak<dyn DetectionListener>>>>;

/// Schedules contour detection off the frame cadence.
pub struct ContourAnalyzer {
    sender: Option<Sender<AnalysisRequest>>,
    listener: ListenerSlot,
    next_seq: AtomicU64,
    thread_handle: Option<JoinHandle<()>>,
}

impl ContourAnalyzer {
    /// Spawn the analysis worker around a detection backend.
    pub fn new(detector: impl ContourDetector + 'static, orientation: Orientation) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded::<AnalysisRequest>(2);
        let listener: ListenerSlot = Arc::new(Mutex::new(None));
        let listener_for_worker = listener.clone();

        let thread_handle = std::thread::Builder::new()
            .name("contour-analysis".to_string())
            .spawn(move || {
                Self::worker(receiver, detector, listener_for_worker, orientation);
            });

        match thread_handle {
            Ok(handle) => Self {
                sender: Some(sender),
                listener,
                next_seq: AtomicU64::new(0),
                thread_handle: Some(handle),
            },
            Err(e) => {
                log::error!("Failed to spawn analysis thread: {e}");
                Self {
                    sender: None,
                    listener,
                    next_seq: AtomicU64::new(0),
                    thread_handle: None,
                }
            }
        }
    }

    fn worker(
        receiver: Receiver<AnalysisRequest>,
        mut detector: impl ContourDetector,
        listener: ListenerSlot,
        orientation: Orientation,
    ) {
        log::info!("Contour analysis thread started");

        while let Ok(request) = receiver.recv() {
            match detector.detect(&request.frame, orientation) {
                Ok(detection) => {
                    let listener = listener.lock().as_ref().and_then(Weak::upgrade);
                    if let Some(listener) = listener {
                        listener.detection_ready(DetectionUpdate {
                            request_seq: request.seq,
                            path: detection.path,
                            contour_count: detection.contour_count,
                        });
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Contour detection failed for frame {}: {}",
                        request.frame.frame_number,
                        e
                    );
                }
            }
        }

        log::info!("Contour analysis thread stopped");
    }

    /// Register the detection listener. Non-owning.
    pub fn set_listener(&self, listener: Weak<dyn DetectionListener>) {
        *self.listener.lock() = Some(listener);
    }

    /// Deregister the detection listener.
    pub fn clear_listener(&self) {
        *self.listener.lock() = None;
    }

    /// Submit a frame for analysis. Returns immediately.
    ///
    /// A full queue drops the request; the frame cadence is never blocked
    /// on analysis.
    pub fn analyze(&self, frame: &Frame) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let Some(sender) = &self.sender else {
            return;
        };
        if sender
            .try_send(AnalysisRequest {
                seq,
                frame: frame.clone(),
            })
            .is_err()
        {
            log::debug!("Analysis queue full, dropping frame {}", frame.frame_number);
        }
    }

    /// Stop the worker thread.
    pub fn stop(&mut self) {
        self.sender = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ContourAnalyzer {
    fn drop(&mut self) {
        self.stop();
    }
}
