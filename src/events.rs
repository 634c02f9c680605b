use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::{debug, info};

/// Diagnostic events emitted by a watching session
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// The watcher is being constructed
    Initializing,
    /// The camera was asked to switch resolution
    ResolutionChanged { width: u32, height: u32 },
    /// The oldest test frame was dropped from the pair
    FrameEvicted { frame_id: u64 },
    /// A test frame is being captured
    CapturingTestFrame,
    /// A test frame entered the pair
    FrameCaptured { frame_id: u64, bytes: usize },
    /// A full pair was scored
    MotionScored {
        changed_samples: usize,
        pixels_changed: u64,
        minimum: f64,
    },
    /// A full-resolution capture was requested
    CaptureTriggered { path: PathBuf },
    /// The loop observed the shutdown flag
    ShutdownObserved,
    /// The camera is being released
    ClosingCamera,
}

impl WatchEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            WatchEvent::Initializing => "Initializing...".to_string(),
            WatchEvent::ResolutionChanged { width, height } => {
                format!("Setting resolution to {}, {}", width, height)
            }
            WatchEvent::FrameEvicted { .. } => "Removing oldest image.".to_string(),
            WatchEvent::CapturingTestFrame => "Capturing test image.".to_string(),
            WatchEvent::FrameCaptured { frame_id, bytes } => {
                format!("Captured test frame {} ({} bytes)", frame_id, bytes)
            }
            WatchEvent::MotionScored {
                pixels_changed,
                minimum,
                ..
            } => format!("Pixels Changed: {}, minimum: {}", pixels_changed, minimum),
            WatchEvent::CaptureTriggered { path } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Triggering capture {}", name)
            }
            WatchEvent::ShutdownObserved => "Shutdown observed, leaving watch loop".to_string(),
            WatchEvent::ClosingCamera => "Closing camera...".to_string(),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            WatchEvent::Initializing => "initializing",
            WatchEvent::ResolutionChanged { .. } => "resolution_changed",
            WatchEvent::FrameEvicted { .. } => "frame_evicted",
            WatchEvent::CapturingTestFrame => "capturing_test_frame",
            WatchEvent::FrameCaptured { .. } => "frame_captured",
            WatchEvent::MotionScored { .. } => "motion_scored",
            WatchEvent::CaptureTriggered { .. } => "capture_triggered",
            WatchEvent::ShutdownObserved => "shutdown_observed",
            WatchEvent::ClosingCamera => "closing_camera",
        }
    }
}

/// Receiver for the watcher's diagnostics
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &WatchEvent);
}

/// Renders events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &WatchEvent) {
        match event {
            WatchEvent::CaptureTriggered { .. } | WatchEvent::ShutdownObserved => {
                info!(event = event.event_type(), "{}", event.description());
            }
            WatchEvent::MotionScored {
                changed_samples,
                pixels_changed,
                minimum,
            } => {
                debug!(
                    event = event.event_type(),
                    changed_samples,
                    pixels_changed,
                    minimum,
                    "{}",
                    event.description()
                );
            }
            _ => debug!(event = event.event_type(), "{}", event.description()),
        }
    }
}

/// In-memory event recorder
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<WatchEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<WatchEvent> {
        self.events.lock().clone()
    }

    /// Recorded events of one type
    pub fn of_type(&self, event_type: &str) -> Vec<WatchEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &WatchEvent) {
        self.events.lock().push(event.clone());
    }
}
