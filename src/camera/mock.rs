use super::interface::Camera;
use crate::error::{CameraError, Result};
use crate::frame::{Frame, FrameFormat};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// One call received by a [`MockCamera`]
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    SetResolution { width: u32, height: u32 },
    CaptureToBuffer {
        format: FrameFormat,
        use_video_port: bool,
    },
    CaptureToFile {
        path: PathBuf,
        resolution: (u32, u32),
    },
    Close,
}

/// Shared record of the calls a mock camera received
#[derive(Debug, Clone, Default)]
pub struct CameraCallLog {
    calls: Arc<Mutex<Vec<CameraCall>>>,
}

impl CameraCallLog {
    fn record(&self, call: CameraCall) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<CameraCall> {
        self.calls.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, CameraCall::Close))
            .count()
    }

    pub fn buffer_capture_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, CameraCall::CaptureToBuffer { .. }))
            .count()
    }

    /// Destination and resolution of every still capture
    pub fn file_captures(&self) -> Vec<(PathBuf, (u32, u32))> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                CameraCall::CaptureToFile { path, resolution } => Some((path.clone(), *resolution)),
                _ => None,
            })
            .collect()
    }
}

type CaptureHook = Box<dyn FnMut(u64) + Send>;

/// Scripted camera for exercising the watcher without hardware.
///
/// Buffer captures return the scripted buffers in order and fall back to a
/// black frame at the current resolution once the script runs out.
pub struct MockCamera {
    resolution: (u32, u32),
    frames: VecDeque<Vec<u8>>,
    next_frame_id: u64,
    log: CameraCallLog,
    fail_buffer_capture_on: Option<u64>,
    fail_file_capture: bool,
    fail_close: bool,
    on_buffer_capture: Option<CaptureHook>,
    closed: bool,
}

impl MockCamera {
    pub fn new() -> Self {
        Self {
            resolution: (0, 0),
            frames: VecDeque::new(),
            next_frame_id: 0,
            log: CameraCallLog::default(),
            fail_buffer_capture_on: None,
            fail_file_capture: false,
            fail_close: false,
            on_buffer_capture: None,
            closed: false,
        }
    }

    /// Queue raw buffers returned by successive buffer captures
    pub fn with_frames<I>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        self.frames.extend(frames);
        self
    }

    /// Fail the buffer capture with this zero-based index
    pub fn fail_buffer_capture_on(mut self, index: u64) -> Self {
        self.fail_buffer_capture_on = Some(index);
        self
    }

    pub fn fail_file_capture(mut self) -> Self {
        self.fail_file_capture = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Run `hook` while a buffer capture is in progress, with the capture index
    pub fn on_buffer_capture<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.on_buffer_capture = Some(Box::new(hook));
        self
    }

    /// Handle to the call log, valid after the camera is moved or dropped
    pub fn log(&self) -> CameraCallLog {
        self.log.clone()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(CameraError::Closed.into())
        } else {
            Ok(())
        }
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for MockCamera {
    fn set_resolution(&mut self, resolution: (u32, u32)) -> Result<()> {
        self.log.record(CameraCall::SetResolution {
            width: resolution.0,
            height: resolution.1,
        });
        self.ensure_open()?;
        self.resolution = resolution;
        Ok(())
    }

    fn capture_to_buffer(&mut self, format: FrameFormat, use_video_port: bool) -> Result<Frame> {
        self.log.record(CameraCall::CaptureToBuffer {
            format,
            use_video_port,
        });
        self.ensure_open()?;

        let frame_id = self.next_frame_id;
        self.next_frame_id += 1;

        if let Some(hook) = self.on_buffer_capture.as_mut() {
            hook(frame_id);
        }

        if self.fail_buffer_capture_on == Some(frame_id) {
            return Err(CameraError::CaptureStream {
                details: format!("injected failure on buffer capture {}", frame_id),
            }
            .into());
        }

        let (width, height) = self.resolution;
        let data = self.frames.pop_front().unwrap_or_else(|| {
            vec![0u8; width as usize * height as usize * format.bytes_per_pixel()]
        });

        debug!("Mock camera produced frame {} ({} bytes)", frame_id, data.len());
        Ok(Frame::new(
            frame_id,
            SystemTime::now(),
            data,
            width,
            height,
            format,
        ))
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<()> {
        self.log.record(CameraCall::CaptureToFile {
            path: path.to_path_buf(),
            resolution: self.resolution,
        });
        self.ensure_open()?;

        if self.fail_file_capture {
            return Err(CameraError::CaptureStream {
                details: format!("injected failure capturing {}", path.display()),
            }
            .into());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.log.record(CameraCall::Close);
        self.ensure_open()?;
        self.closed = true;

        if self.fail_close {
            return Err(CameraError::Configuration {
                details: "injected failure releasing camera".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
