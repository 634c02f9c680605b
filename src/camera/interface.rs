use crate::error::Result;
use crate::frame::{Frame, FrameFormat};
use std::path::Path;

/// Camera device driven by the watcher.
///
/// All calls block until the device has finished the request. A resolution
/// change must be complete before the next capture call returns.
pub trait Camera {
    /// Switch capture mode to `(width, height)`
    fn set_resolution(&mut self, resolution: (u32, u32)) -> Result<()>;

    /// Capture one raw frame into memory at the current resolution.
    ///
    /// `use_video_port` selects the low-latency path that keeps the sensor
    /// streaming between calls.
    fn capture_to_buffer(&mut self, format: FrameFormat, use_video_port: bool) -> Result<Frame>;

    /// Capture one encoded still to `path` at the current resolution
    fn capture_to_file(&mut self, path: &Path) -> Result<()>;

    /// Release the device
    fn close(&mut self) -> Result<()>;
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn set_resolution(&mut self, resolution: (u32, u32)) -> Result<()> {
        (**self).set_resolution(resolution)
    }

    fn capture_to_buffer(&mut self, format: FrameFormat, use_video_port: bool) -> Result<Frame> {
        (**self).capture_to_buffer(format, use_video_port)
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<()> {
        (**self).capture_to_file(path)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
