//! Camera Filters - Main Entry Point
//!
//! Headless demo wiring: opens the default camera, runs frames through
//! the filter pipeline, and drains the render mailbox while logging
//! throughput and the latest contour detection.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use camera_filters::analysis::detector::ThresholdContourDetector;
use camera_filters::analysis::{ContourAnalyzer, DetectionListener, Orientation};
use camera_filters::capture::device::NokhwaBackend;
use camera_filters::capture::{CaptureBackend, CaptureSession, CaptureState, SessionDelegate};
use camera_filters::config::PipelineConfig;
use camera_filters::filters::builtin::builtin_catalog;
use camera_filters::geometry::Viewport;
use camera_filters::pipeline::FramePipeline;
use camera_filters::surface::{RenderMailbox, VideoSurface};

const CONFIG_PATH: &str = "camera-filters.json";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Camera Filters v0.1.0");

    let config = PipelineConfig::load_or_default(Path::new(CONFIG_PATH));

    let backend = NokhwaBackend::new();
    let devices = backend.devices();
    if devices.is_empty() {
        log::warn!("No cameras detected");
    }
    for device in &devices {
        log::info!("Camera {}: {}", device.index, device.name);
    }

    let analyzer = Arc::new(ContourAnalyzer::new(
        ThresholdContourDetector::new(config.analysis_max_dimension, config.contour_threshold),
        Orientation::RightMirrored,
    ));

    let mailbox = Arc::new(RenderMailbox::new());
    let overlay_listener: Arc<dyn DetectionListener> = mailbox.clone();
    analyzer.set_listener(Arc::downgrade(&overlay_listener));

    let catalog = builtin_catalog(analyzer.clone()).expect("Failed to build filter catalog");
    log::info!("Filters: {}", catalog.names_in_order().join(", "));

    let viewport = Viewport::new(config.viewport_width, config.viewport_height);
    let pipeline = Arc::new(FramePipeline::new(catalog, viewport));
    if let Err(e) = pipeline.select_filter(&config.default_filter) {
        log::warn!("Keeping default filter selection: {e}");
    }
    log::info!("Active filter: {}", pipeline.active_filter_name());

    let surface: Arc<dyn VideoSurface> = mailbox.clone();
    pipeline.set_surface(Arc::downgrade(&surface));

    let session = CaptureSession::new(backend);
    let delegate: Arc<dyn SessionDelegate> = pipeline.clone();
    session.set_delegate(Arc::downgrade(&delegate));
    session.start_displaying();

    // Render-context loop: drain the latest-frame slot, surface terminal
    // signals, and report once a second.
    let mut total_frames: u64 = 0;
    let mut frames_since_report: u64 = 0;
    let mut last_report = Instant::now();
    let mut last_size = (0u32, 0u32);

    loop {
        if let Some(frame) = mailbox.take_frame() {
            total_frames += 1;
            frames_since_report += 1;
            last_size = (frame.width, frame.height);
        }

        if mailbox.is_access_denied() {
            log::error!("Camera access denied; enable camera permission and restart");
            break;
        }
        if let Some(reason) = mailbox.configuration_failure() {
            log::error!("Capture configuration failed: {reason}");
            break;
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let (contours, path_points) = mailbox
                .latest_overlay()
                .map(|o| (o.contour_count, o.path.len()))
                .unwrap_or((0, 0));
            log::info!(
                "{} fps ({}x{}, {} total), contours: {} ({} path points)",
                frames_since_report,
                last_size.0,
                last_size.1,
                total_frames,
                contours,
                path_points
            );
            frames_since_report = 0;
            last_report = Instant::now();

            if session.state() != CaptureState::Running && total_frames == 0 {
                log::warn!("Session state: {:?}", session.state());
            }
        }

        std::thread::sleep(Duration::from_millis(5));
    }

    session.stop();
}
