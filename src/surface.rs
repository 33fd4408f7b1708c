//! Render surface collaborators.
//!
//! The pipeline and analyzer never touch render state directly: they hand
//! results to a [`VideoSurface`] / [`DetectionListener`], and the
//! [`RenderMailbox`] adapter marshals those deliveries into whichever
//! single context owns the visible surface. Producers overwrite latest
//! slots; the render context drains them at its own cadence.

use glam::Vec2;
use parking_lot::Mutex;

use crate::analysis::{DetectionListener, DetectionUpdate};
use crate::geometry::{self, Viewport};

/// A display-ready RGBA image sized to the viewport.
#[derive(Clone)]
pub struct DisplayFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub frame_number: u64,
}

/// The visible render target.
///
/// Implementations own their thread affinity; these methods may be called
/// from the capture or analysis threads and must only *stage* state, not
/// mutate anything the render context reads unsynchronized.
pub trait VideoSurface: Send + Sync {
    /// Present a finished frame.
    fn display(&self, frame: DisplayFrame);

    /// Capture permission was denied; show the terminal denied state.
    fn access_denied(&self);

    /// Session configuration failed; terminal for this session.
    fn configuration_failed(&self, _reason: &str) {}
}

/// Latest-slot mailbox between the pipeline threads and the render
/// context.
///
/// Every delivery overwrites the previous one; the render context polls
/// [`RenderMailbox::take_frame`] and [`RenderMailbox::latest_overlay`]
/// once per redraw. The overlay keeps the most recently *delivered*
/// detection, whatever its submission order.
#[derive(Default)]
pub struct RenderMailbox {
    frame: Mutex<Option<DisplayFrame>>,
    overlay: Mutex<Option<DetectionUpdate>>,
    access_denied: Mutex<u64>,
    failure: Mutex<Option<String>>,
}

impl RenderMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the newest undisplayed frame, if any.
    pub fn take_frame(&self) -> Option<DisplayFrame> {
        self.frame.lock().take()
    }

    /// The most recently delivered detection.
    pub fn latest_overlay(&self) -> Option<DetectionUpdate> {
        self.overlay.lock().clone()
    }

    /// The latest overlay path mapped into viewport pixels.
    pub fn overlay_path_in(&self, viewport: Viewport) -> Vec<Vec2> {
        match self.latest_overlay() {
            Some(update) => geometry::normalized_path_to_viewport(&update.path, viewport),
            None => Vec::new(),
        }
    }

    pub fn is_access_denied(&self) -> bool {
        *self.access_denied.lock() > 0
    }

    /// How many times the denied signal arrived.
    pub fn access_denied_signals(&self) -> u64 {
        *self.access_denied.lock()
    }

    pub fn configuration_failure(&self) -> Option<String> {
        self.failure.lock().clone()
    }
}

impl VideoSurface for RenderMailbox {
    fn display(&self, frame: DisplayFrame) {
        *self.frame.lock() = Some(frame);
    }

    fn access_denied(&self) {
        *self.access_denied.lock() += 1;
    }

    fn configuration_failed(&self, reason: &str) {
        *self.failure.lock() = Some(reason.to_string());
    }
}

impl DetectionListener for RenderMailbox {
    fn detection_ready(&self, update: DetectionUpdate) {
        *self.overlay.lock() = Some(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(seq: u64) -> DetectionUpdate {
        DetectionUpdate {
            request_seq: seq,
            path: vec![Vec2::ZERO, Vec2::ONE],
            contour_count: 1,
        }
    }

    #[test]
    fn test_frame_slot_keeps_newest_and_drains() {
        let mailbox = RenderMailbox::new();
        mailbox.display(DisplayFrame {
            data: Vec::new(),
            width: 2,
            height: 2,
            frame_number: 1,
        });
        mailbox.display(DisplayFrame {
            data: Vec::new(),
            width: 2,
            height: 2,
            frame_number: 2,
        });

        assert_eq!(mailbox.take_frame().unwrap().frame_number, 2);
        assert!(mailbox.take_frame().is_none());
    }

    #[test]
    fn test_latest_delivered_detection_wins() {
        // Two analyses completing in reverse submission order: the later
        // submission (seq 2) lands first, then the earlier one (seq 1)
        // overwrites it. Latest *delivered* is authoritative.
        let mailbox = RenderMailbox::new();
        mailbox.detection_ready(update(2));
        mailbox.detection_ready(update(1));

        assert_eq!(mailbox.latest_overlay().unwrap().request_seq, 1);
    }

    #[test]
    fn test_overlay_path_mapping() {
        let mailbox = RenderMailbox::new();
        assert!(mailbox.overlay_path_in(Viewport::new(10.0, 10.0)).is_empty());

        mailbox.detection_ready(update(0));
        let mapped = mailbox.overlay_path_in(Viewport::new(100.0, 200.0));
        assert_eq!(mapped.len(), 2);
        assert!(mapped[1].abs_diff_eq(Vec2::new(100.0, 200.0), 1e-3));
    }

    #[test]
    fn test_access_denied_counter() {
        let mailbox = RenderMailbox::new();
        assert!(!mailbox.is_access_denied());
        mailbox.access_denied();
        assert!(mailbox.is_access_denied());
        assert_eq!(mailbox.access_denied_signals(), 1);
    }

    #[test]
    fn test_configuration_failure_is_stored() {
        let mailbox = RenderMailbox::new();
        assert!(mailbox.configuration_failure().is_none());
        mailbox.configuration_failed("no capture device available");
        assert_eq!(
            mailbox.configuration_failure().as_deref(),
            Some("no capture device available")
        );
    }
}
