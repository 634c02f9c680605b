pub mod camera;
pub mod config;
pub mod detector;
pub mod error;
pub mod events;
pub mod frame;
pub mod frame_pair;
pub mod runtime;
pub mod watcher;

pub use camera::{BoxedCamera, Camera, CameraBuilder, MockCamera, SimulatedCamera};
pub use config::{CameraBackend, MotionWatchConfig};
pub use detector::{MotionDetector, MotionScore};
pub use error::{CameraError, DetectorError, MotionError, Result};
pub use events::{EventLog, EventSink, TracingSink, WatchEvent};
pub use frame::{Frame, FrameFormat};
pub use frame_pair::FramePair;
pub use watcher::{CameraSession, ShutdownToken, Watcher, WatcherState};
