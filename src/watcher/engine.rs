use super::session::CameraSession;
use super::shutdown::ShutdownToken;
use super::types::WatcherState;
use crate::camera::Camera;
use crate::config::MotionWatchConfig;
use crate::detector::{MotionDetector, MotionScore};
use crate::error::Result;
use crate::events::{EventSink, WatchEvent};
use crate::frame::FrameFormat;
use crate::frame_pair::FramePair;
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Name of a triggered capture taken at `timestamp`
pub fn capture_filename(timestamp: NaiveDateTime) -> String {
    timestamp.format("capture%Y%m%d%H%M%S.jpg").to_string()
}

/// Motion watcher: keeps the two latest test frames, scores them and takes a
/// full-resolution still when the score clears the trigger floor.
pub struct Watcher<C: Camera> {
    session: CameraSession<C>,
    detector: MotionDetector,
    frames: FramePair,
    test_resolution: (u32, u32),
    capture_resolution: (u32, u32),
    capture_dir: PathBuf,
    shutdown: ShutdownToken,
    sink: Arc<dyn EventSink>,
    state: WatcherState,
    captures: u64,
}

impl<C: Camera> Watcher<C> {
    /// Take ownership of `camera` and wait out the configured warm-up
    pub fn open(
        camera: C,
        config: &MotionWatchConfig,
        shutdown: ShutdownToken,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        sink.emit(&WatchEvent::Initializing);

        let session = CameraSession::open(camera, Arc::clone(&sink));
        if config.camera.warmup_ms > 0 {
            std::thread::sleep(Duration::from_millis(config.camera.warmup_ms));
        }

        Self {
            session,
            detector: MotionDetector::new(config.detector.clone()),
            frames: FramePair::new(),
            test_resolution: config.detector.test_resolution,
            capture_resolution: config.detector.capture_resolution,
            capture_dir: config.capture.path.clone(),
            shutdown,
            sink,
            state: WatcherState::Ready,
            captures: 0,
        }
    }

    pub fn continue_looping(&self) -> bool {
        self.shutdown.continue_looping()
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn frames(&self) -> &FramePair {
        &self.frames
    }

    pub fn detector(&self) -> &MotionDetector {
        &self.detector
    }

    /// Number of full-resolution captures taken so far
    pub fn capture_count(&self) -> u64 {
        self.captures
    }

    /// One loop iteration: grab a test frame and compare once two are held
    pub fn watch(&mut self) -> Result<()> {
        if self.state == WatcherState::Ready {
            self.state = WatcherState::Watching;
        }

        self.set_resolution(self.test_resolution)?;

        self.sink.emit(&WatchEvent::CapturingTestFrame);
        let frame = self
            .session
            .camera_mut()?
            .capture_to_buffer(FrameFormat::Rgba, true)?;
        self.sink.emit(&WatchEvent::FrameCaptured {
            frame_id: frame.id(),
            bytes: frame.len(),
        });

        if let Some(evicted) = self.frames.push(frame) {
            self.sink.emit(&WatchEvent::FrameEvicted {
                frame_id: evicted.id(),
            });
        }

        if self.frames.is_full() {
            self.compare()?;
        }
        Ok(())
    }

    /// Score the buffered pair and capture on motion.
    ///
    /// Returns `None` while fewer than two frames are held.
    pub fn compare(&mut self) -> Result<Option<MotionScore>> {
        let score = match self.frames.pair() {
            Some((oldest, newest)) => self.detector.score(oldest, newest)?,
            None => return Ok(None),
        };

        self.sink.emit(&WatchEvent::MotionScored {
            changed_samples: score.changed_samples,
            pixels_changed: score.pixels_changed(),
            minimum: score.trigger_floor,
        });

        if score.is_motion() {
            self.capture()?;
        }
        Ok(Some(score))
    }

    /// Switch to the capture resolution and take a timestamped still
    pub fn capture(&mut self) -> Result<PathBuf> {
        self.set_resolution(self.capture_resolution)?;

        let path = self
            .capture_dir
            .join(capture_filename(Local::now().naive_local()));
        self.sink
            .emit(&WatchEvent::CaptureTriggered { path: path.clone() });

        self.session.camera_mut()?.capture_to_file(&path)?;
        self.captures += 1;
        Ok(path)
    }

    /// Call [`Watcher::watch`] until shutdown is requested or an iteration fails.
    ///
    /// An iteration in progress always completes before the flag is checked.
    pub fn run(&mut self) -> Result<()> {
        let result = loop {
            if !self.continue_looping() {
                self.sink.emit(&WatchEvent::ShutdownObserved);
                break Ok(());
            }
            if let Err(e) = self.watch() {
                break Err(e);
            }
        };

        self.state = WatcherState::ShuttingDown;
        result
    }

    /// Release the camera. Dropping the watcher does the same if this is never called.
    pub fn close(&mut self) -> Result<()> {
        let result = self.session.close();
        self.state = WatcherState::Closed;
        result
    }

    fn set_resolution(&mut self, resolution: (u32, u32)) -> Result<()> {
        self.sink.emit(&WatchEvent::ResolutionChanged {
            width: resolution.0,
            height: resolution.1,
        });
        self.session.camera_mut()?.set_resolution(resolution)
    }
}
