use crate::camera::Camera;
use crate::error::{CameraError, Result};
use crate::events::{EventSink, WatchEvent};
use std::sync::Arc;
use tracing::error;

/// Exclusive ownership of the camera for the lifetime of a watching session.
///
/// The camera is released exactly once: by an explicit [`CameraSession::close`]
/// or, failing that, when the session is dropped.
pub struct CameraSession<C: Camera> {
    camera: Option<C>,
    sink: Arc<dyn EventSink>,
}

impl<C: Camera> CameraSession<C> {
    pub fn open(camera: C, sink: Arc<dyn EventSink>) -> Self {
        Self {
            camera: Some(camera),
            sink,
        }
    }

    pub fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    pub fn camera_mut(&mut self) -> Result<&mut C> {
        self.camera.as_mut().ok_or_else(|| CameraError::Closed.into())
    }

    /// Release the camera; a no-op once already released
    pub fn close(&mut self) -> Result<()> {
        match self.camera.take() {
            Some(mut camera) => {
                self.sink.emit(&WatchEvent::ClosingCamera);
                camera.close()
            }
            None => Ok(()),
        }
    }
}

impl<C: Camera> Drop for CameraSession<C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to release camera: {}", e);
        }
    }
}
