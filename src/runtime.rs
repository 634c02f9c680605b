use crate::camera::{Camera, CameraBuilder};
use crate::config::{CameraBackend, MotionWatchConfig};
use crate::error::{MotionError, Result};
use crate::events::{EventSink, TracingSink};
use crate::watcher::{ShutdownToken, Watcher};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Open the configured camera and watch until SIGINT/SIGTERM or a fault
pub async fn run(config: MotionWatchConfig, backend: Option<CameraBackend>) -> Result<()> {
    let shutdown = ShutdownToken::new();
    setup_signal_handlers(shutdown.clone());

    run_session(config, backend, shutdown, Arc::new(TracingSink)).await
}

/// Open the camera on a blocking worker and drive a watching session on it
pub async fn run_session(
    config: MotionWatchConfig,
    backend: Option<CameraBackend>,
    shutdown: ShutdownToken,
    sink: Arc<dyn EventSink>,
) -> Result<()> {
    tokio::fs::create_dir_all(&config.capture.path).await?;
    info!("Writing captures to {}", config.capture.path.display());

    let camera_config = config.camera.clone();
    let camera = tokio::task::spawn_blocking(move || {
        let mut builder = CameraBuilder::new().config(camera_config);
        if let Some(backend) = backend {
            builder = builder.backend(backend);
        }
        builder.build()
    })
    .await
    .map_err(|e| MotionError::system(format!("Camera open task failed: {}", e)))??;

    run_with_camera(camera, config, shutdown, sink).await
}

/// Drive a watching session on an already opened camera.
///
/// The loop runs on a blocking worker; the camera is released when the loop
/// ends, whether it stopped on request or on a fault.
pub async fn run_with_camera<C>(
    camera: C,
    config: MotionWatchConfig,
    shutdown: ShutdownToken,
    sink: Arc<dyn EventSink>,
) -> Result<()>
where
    C: Camera + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || {
        let mut watcher = Watcher::open(camera, &config, shutdown, sink);
        info!("Watching for motion");

        let result = watcher.run();
        if let Err(ref e) = result {
            error!("Watch loop stopped on error: {}", e);
        }

        let closed = watcher.close();
        if let Err(ref e) = closed {
            error!("Failed to release camera: {}", e);
        }

        info!("Captured {} stills this session", watcher.capture_count());
        result.and(closed)
    });

    handle
        .await
        .map_err(|e| MotionError::system(format!("Watch loop task failed: {}", e)))?
}

/// Flip the shutdown token on SIGINT (Ctrl+C) and, on Unix, SIGTERM.
///
/// The listeners only touch the token; the loop notices it between iterations.
pub fn setup_signal_handlers(shutdown: ShutdownToken) {
    #[cfg(unix)]
    {
        let shutdown_sigterm = shutdown.clone();
        tokio::spawn(async move {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    if sigterm.recv().await.is_some() {
                        info!("Received SIGTERM signal");
                        info!("Shutting down...");
                        shutdown_sigterm.request_shutdown();
                    }
                }
                Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
            }
        });
    }

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT signal (Ctrl+C)");
                info!("Shutting down...");
                shutdown.request_shutdown();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MockCamera;
    use crate::error::CameraError;
    use crate::events::{EventLog, WatchEvent};

    /// Records events and requests shutdown after the first triggered capture
    struct StopAfterCapture {
        shutdown: ShutdownToken,
        log: EventLog,
    }

    impl EventSink for StopAfterCapture {
        fn emit(&self, event: &WatchEvent) {
            self.log.emit(event);
            if matches!(event, WatchEvent::CaptureTriggered { .. }) {
                self.shutdown.request_shutdown();
            }
        }
    }

    fn create_test_config(capture_dir: &std::path::Path) -> MotionWatchConfig {
        let mut config = MotionWatchConfig::default();
        config.detector.test_resolution = (32, 24);
        config.detector.capture_resolution = (64, 48);
        config.camera.backend = CameraBackend::Gstreamer;
        config.camera.warmup_ms = 0;
        config.camera.simulated_motion_interval = 3;
        config.camera.simulated_frame_interval_ms = 0;
        config.capture.path = capture_dir.join("captures");
        config
    }

    #[tokio::test]
    async fn test_simulated_session_captures_on_scene_change() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config(dir.path());
        let shutdown = ShutdownToken::new();
        let sink = Arc::new(StopAfterCapture {
            shutdown: shutdown.clone(),
            log: EventLog::new(),
        });

        run_session(
            config.clone(),
            Some(CameraBackend::Simulated),
            shutdown,
            sink.clone(),
        )
        .await
        .unwrap();

        // Scene changes at frame 3, so frames 2 and 3 are the first differing pair
        assert_eq!(sink.log.of_type("frame_captured").len(), 4);
        assert_eq!(sink.log.of_type("closing_camera").len(), 1);

        let files: Vec<_> = std::fs::read_dir(&config.capture.path)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("capture") && files[0].ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_session_creates_nested_capture_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config(dir.path());
        config.capture.path = dir.path().join("a").join("b");
        let shutdown = ShutdownToken::new();
        shutdown.request_shutdown();

        run_session(
            config.clone(),
            Some(CameraBackend::Simulated),
            shutdown,
            Arc::new(EventLog::new()),
        )
        .await
        .unwrap();

        assert!(config.capture.path.is_dir());
    }

    #[tokio::test]
    async fn test_stops_immediately_when_already_shut_down() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config(dir.path());
        let camera = MockCamera::new();
        let calls = camera.log();
        let shutdown = ShutdownToken::new();
        shutdown.request_shutdown();

        run_with_camera(camera, config, shutdown, Arc::new(EventLog::new()))
            .await
            .unwrap();

        assert_eq!(calls.buffer_capture_count(), 0);
        assert_eq!(calls.close_count(), 1);
    }

    #[tokio::test]
    async fn test_fault_is_reported_and_camera_released() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config(dir.path());
        let camera = MockCamera::new().fail_buffer_capture_on(0);
        let calls = camera.log();

        let result =
            run_with_camera(camera, config, ShutdownToken::new(), Arc::new(EventLog::new())).await;

        assert!(matches!(
            result,
            Err(MotionError::Camera(CameraError::CaptureStream { .. }))
        ));
        assert_eq!(calls.close_count(), 1);
    }
}
