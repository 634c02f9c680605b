use super::interface::Camera;
use super::simulated::SimulatedCamera;
use crate::config::{CameraBackend, CameraConfig};
use crate::error::{MotionError, Result};

/// Camera handle owned by a watching session
pub type BoxedCamera = Box<dyn Camera + Send>;

/// Builder that opens the configured camera backend
pub struct CameraBuilder {
    config: Option<CameraConfig>,
    backend: Option<CameraBackend>,
}

impl CameraBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            backend: None,
        }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Open this backend instead of the configured one
    pub fn backend(mut self, backend: CameraBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<BoxedCamera> {
        let config = self
            .config
            .ok_or_else(|| MotionError::system("Camera configuration must be specified"))?;

        match self.backend.unwrap_or(config.backend) {
            CameraBackend::Simulated => Ok(Box::new(SimulatedCamera::new(&config))),
            CameraBackend::Gstreamer => open_gstreamer(&config),
        }
    }
}

impl Default for CameraBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(target_os = "linux", feature = "camera"))]
fn open_gstreamer(config: &CameraConfig) -> Result<BoxedCamera> {
    Ok(Box::new(super::gst::GstCamera::new(config)?))
}

#[cfg(not(all(target_os = "linux", feature = "camera")))]
fn open_gstreamer(_config: &CameraConfig) -> Result<BoxedCamera> {
    Err(crate::error::CameraError::DeviceOpen {
        details: "GStreamer backend requires Linux and the `camera` feature; use --simulate"
            .to_string(),
    }
    .into())
}
