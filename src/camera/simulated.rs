use super::interface::Camera;
use crate::config::CameraConfig;
use crate::error::{CameraError, Result};
use crate::frame::{Frame, FrameFormat};
use image::{ImageFormat, RgbImage};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, trace};

/// Hardware-free camera that shows a static random scene and swaps it for a
/// new one every `simulated_motion_interval` frames.
pub struct SimulatedCamera {
    rng: StdRng,
    resolution: (u32, u32),
    scene: Vec<u8>,
    scene_key: Option<((u32, u32), FrameFormat)>,
    frame_counter: u64,
    motion_interval: u64,
    frame_interval: Duration,
    closed: bool,
}

impl SimulatedCamera {
    pub fn new(config: &CameraConfig) -> Self {
        info!(
            "Opening simulated camera (seed {}, scene change every {} frames)",
            config.simulated_seed, config.simulated_motion_interval
        );

        Self {
            rng: StdRng::seed_from_u64(config.simulated_seed),
            resolution: (0, 0),
            scene: Vec::new(),
            scene_key: None,
            frame_counter: 0,
            motion_interval: u64::from(config.simulated_motion_interval.max(1)),
            frame_interval: Duration::from_millis(config.simulated_frame_interval_ms),
            closed: false,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(CameraError::Closed.into())
        } else {
            Ok(())
        }
    }

    fn regenerate_scene(&mut self, format: FrameFormat) {
        let (width, height) = self.resolution;
        let mut scene = vec![0u8; width as usize * height as usize * format.bytes_per_pixel()];
        self.rng.fill_bytes(&mut scene);
        self.scene = scene;
        self.scene_key = Some((self.resolution, format));
    }
}

impl Camera for SimulatedCamera {
    fn set_resolution(&mut self, resolution: (u32, u32)) -> Result<()> {
        self.ensure_open()?;
        if resolution.0 == 0 || resolution.1 == 0 {
            return Err(CameraError::Configuration {
                details: format!("invalid resolution {}x{}", resolution.0, resolution.1),
            }
            .into());
        }
        self.resolution = resolution;
        Ok(())
    }

    fn capture_to_buffer(&mut self, format: FrameFormat, use_video_port: bool) -> Result<Frame> {
        self.ensure_open()?;

        if !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }

        let frame_id = self.frame_counter;
        self.frame_counter += 1;

        let stale = self.scene_key != Some((self.resolution, format));
        if stale || frame_id % self.motion_interval == 0 {
            debug!("Simulated scene change at frame {}", frame_id);
            self.regenerate_scene(format);
        }

        let (width, height) = self.resolution;
        trace!(
            "Generated simulated frame {} ({}x{}, video port: {})",
            frame_id,
            width,
            height,
            use_video_port
        );

        Ok(Frame::new(
            frame_id,
            SystemTime::now(),
            self.scene.clone(),
            width,
            height,
            format,
        ))
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<()> {
        self.ensure_open()?;

        let (width, height) = self.resolution;
        let shade = (self.frame_counter % 256) as u8;
        let image = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                shade,
            ])
        });

        image
            .save_with_format(path, ImageFormat::Jpeg)
            .map_err(|e| CameraError::CaptureStream {
                details: format!("failed to write {}: {}", path.display(), e),
            })?;

        info!("Simulated still written to {}", path.display());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        debug!("Simulated camera closed after {} frames", self.frame_counter);
        Ok(())
    }
}
