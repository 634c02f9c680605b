use super::interface::Camera;
use crate::config::CameraConfig;
use crate::error::{CameraError, Result};
use crate::frame::{Frame, FrameFormat};
use gstreamer::prelude::*;
use gstreamer::{ClockTime, Pipeline};
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

/// Raw preview pipeline kept alive between fast-path captures
struct Preview {
    resolution: (u32, u32),
    format: FrameFormat,
    pipeline: Pipeline,
    appsink: AppSink,
}

/// GStreamer camera backend.
///
/// Buffer captures on the video port reuse a streaming preview pipeline for
/// the current resolution; other captures build a one-shot pipeline.
pub struct GstCamera {
    source: String,
    resolution: (u32, u32),
    timeout: ClockTime,
    preview: Option<Preview>,
    frame_counter: u64,
    closed: bool,
}

impl GstCamera {
    pub fn new(config: &CameraConfig) -> Result<Self> {
        info!("Initializing GStreamer camera from source '{}'", config.source);

        gstreamer::init().map_err(|e| CameraError::DeviceOpen {
            details: format!("Failed to initialize GStreamer: {}", e),
        })?;

        Ok(Self {
            source: config.source.clone(),
            resolution: (0, 0),
            timeout: ClockTime::from_mseconds(config.capture_timeout_ms),
            preview: None,
            frame_counter: 0,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(CameraError::Closed.into())
        } else {
            Ok(())
        }
    }

    /// Build GStreamer pipeline string for raw frame capture
    fn raw_pipeline_string(&self, format: FrameFormat, streaming: bool) -> String {
        let (width, height) = self.resolution;
        let sink = if streaming {
            "appsink name=sink sync=false max-buffers=1 drop=true"
        } else {
            "appsink name=sink sync=false max-buffers=1"
        };

        format!(
            "{} ! videoconvert ! videoscale ! \
             video/x-raw,format={},width={},height={} ! {}",
            self.source,
            format.caps_name(),
            width,
            height,
            sink
        )
    }

    /// Build GStreamer pipeline string for a JPEG still
    fn still_pipeline_string(&self) -> String {
        let (width, height) = self.resolution;
        format!(
            "{} ! videoconvert ! videoscale ! video/x-raw,width={},height={} ! \
             jpegenc quality=90 ! appsink name=sink sync=false max-buffers=1",
            self.source, width, height
        )
    }

    fn launch(description: &str) -> Result<(Pipeline, AppSink)> {
        debug!("Creating GStreamer pipeline: {}", description);

        let pipeline = gstreamer::parse::launch(description)
            .map_err(|e| CameraError::Configuration {
                details: format!("Failed to create pipeline: {}", e),
            })?
            .downcast::<Pipeline>()
            .map_err(|_| CameraError::Configuration {
                details: "Failed to downcast to Pipeline".to_string(),
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| CameraError::Configuration {
                details: "Failed to get appsink element".to_string(),
            })?
            .downcast::<AppSink>()
            .map_err(|_| CameraError::Configuration {
                details: "Failed to downcast to AppSink".to_string(),
            })?;

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| CameraError::DeviceOpen {
                details: format!("Failed to start pipeline: {}", e),
            })?;

        Ok((pipeline, appsink))
    }

    fn pull_sample(&self, appsink: &AppSink) -> Result<gstreamer::Sample> {
        appsink.try_pull_sample(self.timeout).ok_or_else(|| {
            CameraError::CaptureStream {
                details: format!("No sample received within {}", self.timeout),
            }
            .into()
        })
    }

    fn stop_preview(&mut self) {
        if let Some(preview) = self.preview.take() {
            if let Err(e) = preview.pipeline.set_state(gstreamer::State::Null) {
                warn!("Failed to stop preview pipeline: {}", e);
            }
        }
    }

    fn preview_matches(&self, format: FrameFormat) -> bool {
        self.preview
            .as_ref()
            .map(|p| p.resolution == self.resolution && p.format == format)
            .unwrap_or(false)
    }

    /// Copy a raw sample into a tightly packed frame
    fn sample_to_frame(&mut self, sample: &gstreamer::Sample, format: FrameFormat) -> Result<Frame> {
        let buffer = sample.buffer().ok_or_else(|| CameraError::CaptureStream {
            details: "No buffer in sample".to_string(),
        })?;

        let caps = sample.caps().ok_or_else(|| CameraError::CaptureStream {
            details: "No caps in sample".to_string(),
        })?;

        let video_info = VideoInfo::from_caps(caps).map_err(|e| CameraError::CaptureStream {
            details: format!("Failed to get video info: {}", e),
        })?;

        let map = buffer
            .map_readable()
            .map_err(|e| CameraError::CaptureStream {
                details: format!("Failed to map buffer: {}", e),
            })?;

        let width = video_info.width();
        let height = video_info.height();
        let row_bytes = width as usize * format.bytes_per_pixel();
        let stride = video_info.stride().first().copied().unwrap_or(0);
        let data = pack_rows(map.as_slice(), row_bytes, stride, height as usize)?;

        let frame_id = self.frame_counter;
        self.frame_counter += 1;

        let frame = Frame::new(frame_id, SystemTime::now(), data, width, height, format);
        frame.ensure_valid()?;

        trace!(
            "Captured {:?} frame {} ({}x{}, {} bytes)",
            format,
            frame_id,
            width,
            height,
            frame.len()
        );
        Ok(frame)
    }
}

/// Strip per-row padding so the frame is tightly packed
fn pack_rows(raw: &[u8], row_bytes: usize, stride: i32, height: usize) -> Result<Vec<u8>> {
    let stride = usize::try_from(stride)
        .ok()
        .filter(|&stride| stride >= row_bytes && stride > 0)
        .ok_or_else(|| CameraError::CaptureStream {
            details: format!("Invalid stride {} for {}-byte rows", stride, row_bytes),
        })?;

    if stride == row_bytes {
        return Ok(raw.to_vec());
    }

    let mut packed = Vec::with_capacity(row_bytes * height);
    for row in raw.chunks(stride).take(height) {
        packed.extend_from_slice(&row[..row_bytes.min(row.len())]);
    }
    Ok(packed)
}

impl Camera for GstCamera {
    fn set_resolution(&mut self, resolution: (u32, u32)) -> Result<()> {
        self.ensure_open()?;
        if resolution != self.resolution {
            debug!(
                "Switching GStreamer camera to {}x{}",
                resolution.0, resolution.1
            );
            self.resolution = resolution;
            // The preview is rebuilt lazily at the new size
            self.stop_preview();
        }
        Ok(())
    }

    fn capture_to_buffer(&mut self, format: FrameFormat, use_video_port: bool) -> Result<Frame> {
        self.ensure_open()?;

        if !use_video_port {
            self.stop_preview();
            let (pipeline, appsink) = Self::launch(&self.raw_pipeline_string(format, false))?;
            let sample = self.pull_sample(&appsink);
            let _ = pipeline.set_state(gstreamer::State::Null);
            return self.sample_to_frame(&sample?, format);
        }

        if !self.preview_matches(format) {
            self.stop_preview();
            let (pipeline, appsink) = Self::launch(&self.raw_pipeline_string(format, true))?;
            self.preview = Some(Preview {
                resolution: self.resolution,
                format,
                pipeline,
                appsink,
            });
        }

        let sample = match self.preview.as_ref() {
            Some(preview) => self.pull_sample(&preview.appsink)?,
            None => {
                return Err(CameraError::CaptureStream {
                    details: "Preview pipeline not initialized".to_string(),
                }
                .into())
            }
        };
        self.sample_to_frame(&sample, format)
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<()> {
        self.ensure_open()?;

        // The sensor is exclusive; the preview must release it first
        self.stop_preview();

        let (pipeline, appsink) = Self::launch(&self.still_pipeline_string())?;
        let sample = self.pull_sample(&appsink);
        let _ = pipeline.set_state(gstreamer::State::Null);
        let sample = sample?;

        let buffer = sample.buffer().ok_or_else(|| CameraError::CaptureStream {
            details: "No buffer in still sample".to_string(),
        })?;
        let map = buffer
            .map_readable()
            .map_err(|e| CameraError::CaptureStream {
                details: format!("Failed to map still buffer: {}", e),
            })?;

        std::fs::write(path, map.as_slice())?;

        info!(
            "Still captured to {} ({} bytes)",
            path.display(),
            map.len()
        );
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.stop_preview();
        self.closed = true;
        info!("GStreamer camera closed after {} frames", self.frame_counter);
        Ok(())
    }
}

impl Drop for GstCamera {
    fn drop(&mut self) {
        self.stop_preview();
    }
}
