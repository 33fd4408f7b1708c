//! Platform camera backend built on the nokhwa crate.
//!
//! Opens the camera on a dedicated capture thread and pushes decoded RGBA
//! frames into the session's sink. Setup errors are reported back to the
//! caller instead of silently stalling the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;
use parking_lot::Mutex;

use crate::error::CaptureError;
use crate::frame::Frame;

use super::{AuthorizationStatus, CaptureBackend, DeviceInfo, FrameSink, StreamHandle};

/// Camera access through nokhwa's native platform backends.
pub struct NokhwaBackend;

impl NokhwaBackend {
    pub fn new() -> Self {
        Self
    }

    /// Camera capture loop. Reports setup success or failure through
    /// `ready`, then streams until the running flag clears.
    fn capture_thread(
        camera_index: u32,
        running: Arc<AtomicBool>,
        sink: FrameSink,
        ready: Sender<Result<(), CaptureError>>,
    ) {
        log::info!("Starting camera capture thread (camera {})", camera_index);

        let index = CameraIndex::Index(camera_index);

        // Prefer the highest native resolution, then fall back to looser
        // format requests before giving up.
        let requested =
            RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = match Camera::new(index.clone(), requested) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to open camera with highest resolution: {:?}", e);

                let requested = RequestedFormat::new::<RgbAFormat>(
                    RequestedFormatType::HighestResolution(Resolution::new(640, 480)),
                );

                match Camera::new(index.clone(), requested) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("Failed with bounded resolution: {:?}", e);

                        let requested =
                            RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
                        match Camera::new(index, requested) {
                            Ok(c) => c,
                            Err(e) => {
                                let _ = ready
                                    .send(Err(CaptureError::OpenFailed(format!("{e:?}"))));
                                return;
                            }
                        }
                    }
                }
            }
        };

        if let Err(e) = camera.open_stream() {
            let _ = ready.send(Err(CaptureError::StreamFailed(format!("{e:?}"))));
            return;
        }

        log::info!(
            "Camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );
        let _ = ready.send(Ok(()));

        let mut frame_number: u64 = 0;
        while running.load(Ordering::Acquire) {
            match camera.frame() {
                Ok(buffer) => match buffer.decode_image::<RgbAFormat>() {
                    Ok(decoded) => {
                        let (width, height) = (decoded.width(), decoded.height());
                        sink(Frame::new(decoded.into_raw(), width, height, frame_number));
                        frame_number = frame_number.wrapping_add(1);
                    }
                    Err(e) => {
                        log::warn!("Failed to decode frame: {:?}", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to capture frame: {:?}", e);
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            }
        }

        log::info!("Camera capture thread stopped");
    }
}

impl Default for NokhwaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for NokhwaBackend {
    fn authorization_status(&self) -> AuthorizationStatus {
        if nokhwa::nokhwa_check() {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::NotDetermined
        }
    }

    fn request_access(&self, respond: Box<dyn FnOnce(bool) + Send>) {
        let respond = Mutex::new(Some(respond));
        nokhwa::nokhwa_initialize(move |granted| {
            if let Some(respond) = respond.lock().take() {
                respond(granted);
            }
        });
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        match nokhwa::query(ApiBackend::Auto) {
            Ok(camera_list) => {
                for (index, info) in camera_list.iter().enumerate() {
                    devices.push(DeviceInfo {
                        index: index as u32,
                        name: info.human_name().to_string(),
                    });
                }
            }
            Err(e) => {
                log::warn!("Failed to enumerate cameras: {:?}", e);
            }
        }

        devices
    }

    fn open(&self, device: &DeviceInfo, sink: FrameSink) -> Result<StreamHandle, CaptureError> {
        let running = Arc::new(AtomicBool::new(true));
        let running_for_thread = running.clone();
        let camera_index = device.index;
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let thread = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_thread(camera_index, running_for_thread, sink, ready_tx);
            })
            .map_err(|e| CaptureError::ThreadSpawn(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(StreamHandle::new(running, Some(thread))),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CaptureError::StreamFailed(
                    "capture thread exited during setup".to_string(),
                ))
            }
        }
    }
}
