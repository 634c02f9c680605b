use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("System error: {message}")]
    System { message: String },
}

/// Faults raised by a camera backend
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {details}")]
    DeviceOpen { details: String },

    #[error("Camera configuration failed: {details}")]
    Configuration { details: String },

    #[error("Capture failed: {details}")]
    CaptureStream { details: String },

    #[error("Camera already closed")]
    Closed,
}

#[derive(Error, Debug, PartialEq)]
pub enum DetectorError {
    #[error("Frame size mismatch: oldest frame has {oldest} samples, newest has {newest}")]
    FrameSizeMismatch { oldest: usize, newest: usize },

    #[error("Frame {frame_id} holds {actual} bytes, expected {expected}")]
    InvalidFrame {
        frame_id: u64,
        expected: usize,
        actual: usize,
    },
}

impl MotionError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MotionError>;
