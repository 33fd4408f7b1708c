//! Capture session and device backend.
//!
//! The session owns the permission state machine and the stream
//! lifecycle; the actual device access sits behind [`CaptureBackend`] so
//! the platform camera (and the tests' scripted devices) plug in behind
//! the same seam. Once running, frames are delivered continuously on a
//! dedicated capture thread until the session is torn down.

pub mod device;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::error::CaptureError;
use crate::frame::Frame;

/// Platform authorization status for camera access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

/// Session lifecycle state.
///
/// `Denied`, `Running` and `Failed` are absorbing; only another
/// `start_displaying` call re-initiates from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Unauthorized,
    Denied,
    Authorized,
    Running,
    Failed,
}

/// An available capture device.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    pub index: u32,
    pub name: String,
}

/// Receives session signals and captured frames.
///
/// Registered non-owningly; the session only holds a `Weak` reference.
pub trait SessionDelegate: Send + Sync {
    /// A raw frame arrived on the capture thread.
    fn frame_ready(&self, frame: Frame);

    /// Camera permission was denied.
    fn access_denied(&self);

    /// Device/session setup failed; terminal for this session.
    fn configuration_failed(&self, error: &CaptureError);
}

/// Destination for frames produced by a backend's capture thread.
pub type FrameSink = Box<dyn Fn(Frame) + Send + Sync>;

/// Platform capture collaborator.
pub trait CaptureBackend: Send + Sync + 'static {
    /// Current camera permission status.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the platform for camera access. `respond` is called once,
    /// possibly from another thread.
    fn request_access(&self, respond: Box<dyn FnOnce(bool) + Send>);

    /// Enumerate available capture devices.
    fn devices(&self) -> Vec<DeviceInfo>;

    /// Open a stream on `device`, pushing frames into `sink` until the
    /// returned handle is stopped.
    fn open(&self, device: &DeviceInfo, sink: FrameSink) -> Result<StreamHandle, CaptureError>;
}

/// Handle to a running capture stream. Stopping clears the running flag
/// and joins the capture thread.
pub struct StreamHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StreamHandle {
    pub fn new(running: Arc<AtomicBool>, thread: Option<JoinHandle<()>>) -> Self {
        Self { running, thread }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SessionInner {
    backend: Box<dyn CaptureBackend>,
    state: Mutex<CaptureState>,
    delegate: Mutex<Option<Weak<dyn SessionDelegate>>>,
    stream: Mutex<Option<StreamHandle>>,
}

impl SessionInner {
    fn delegate(&self) -> Option<Arc<dyn SessionDelegate>> {
        self.delegate.lock().as_ref().and_then(Weak::upgrade)
    }

    fn deny(&self) {
        *self.state.lock() = CaptureState::Denied;
        if let Some(delegate) = self.delegate() {
            delegate.access_denied();
        }
    }

    fn fail(&self, error: CaptureError) {
        log::error!("Capture configuration failed: {error}");
        *self.state.lock() = CaptureState::Failed;
        if let Some(delegate) = self.delegate() {
            delegate.configuration_failed(&error);
        }
    }

    /// Discover the default device and start streaming from it.
    fn configure(self: &Arc<Self>) {
        if self.stream.lock().is_some() {
            return;
        }

        let devices = self.backend.devices();
        let Some(device) = devices.first() else {
            self.fail(CaptureError::NoDevice);
            return;
        };
        log::info!("Using capture device {} ({})", device.index, device.name);

        let weak = Arc::downgrade(self);
        let sink: FrameSink = Box::new(move |frame| {
            if let Some(inner) = weak.upgrade() {
                if let Some(delegate) = inner.delegate() {
                    delegate.frame_ready(frame);
                }
            }
        });

        match self.backend.open(device, sink) {
            Ok(handle) => {
                *self.stream.lock() = Some(handle);
                *self.state.lock() = CaptureState::Running;
                log::info!("Capture session running");
            }
            Err(error) => self.fail(error),
        }
    }
}

/// Owns the permission state machine and the capture stream.
pub struct CaptureSession {
    inner: Arc<SessionInner>,
}

impl CaptureSession {
    pub fn new(backend: impl CaptureBackend) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend: Box::new(backend),
                state: Mutex::new(CaptureState::Unauthorized),
                delegate: Mutex::new(None),
                stream: Mutex::new(None),
            }),
        }
    }

    /// Register the session delegate. Non-owning.
    pub fn set_delegate(&self, delegate: Weak<dyn SessionDelegate>) {
        *self.inner.delegate.lock() = Some(delegate);
    }

    pub fn state(&self) -> CaptureState {
        *self.inner.state.lock()
    }

    /// Check authorization and start streaming.
    ///
    /// Denied permission signals `access_denied` and parks the session in
    /// `Denied`. Undetermined permission requests access asynchronously;
    /// a grant continues into configuration, a refusal signals
    /// `access_denied` exactly once. Configuration failure parks the
    /// session in `Failed` after a `configuration_failed` signal.
    pub fn start_displaying(&self) {
        if self.state() == CaptureState::Running {
            log::debug!("Capture session already running");
            return;
        }

        match self.inner.backend.authorization_status() {
            AuthorizationStatus::Denied => self.inner.deny(),
            AuthorizationStatus::Authorized => {
                *self.inner.state.lock() = CaptureState::Authorized;
                self.inner.configure();
            }
            AuthorizationStatus::NotDetermined => {
                let weak = Arc::downgrade(&self.inner);
                self.inner.backend.request_access(Box::new(move |granted| {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    if granted {
                        *inner.state.lock() = CaptureState::Authorized;
                        inner.configure();
                    } else {
                        inner.deny();
                    }
                }));
            }
        }
    }

    /// Tear the stream down. The session can be re-started afterwards.
    pub fn stop(&self) {
        if let Some(mut handle) = self.inner.stream.lock().take() {
            handle.stop();
        }
        let mut state = self.inner.state.lock();
        if *state == CaptureState::Running {
            *state = CaptureState::Authorized;
        }
    }
}
