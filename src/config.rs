use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MotionWatchConfig {
    pub detector: DetectorConfig,
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Per-channel change a sample must exceed to count as changed
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Low resolution used for test frames (width, height)
    #[serde(default = "default_test_resolution")]
    pub test_resolution: (u32, u32),

    /// Full resolution used for triggered captures (width, height)
    #[serde(default = "default_capture_resolution")]
    pub capture_resolution: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    Gstreamer,
    Simulated,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Which camera implementation to open
    #[serde(default = "default_camera_backend")]
    pub backend: CameraBackend,

    /// GStreamer source element description
    #[serde(default = "default_camera_source")]
    pub source: String,

    /// Settling pause after the camera is opened, in milliseconds
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,

    /// How long to wait for a single sample, in milliseconds
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,

    /// Seed for the simulated scene generator
    #[serde(default = "default_simulated_seed")]
    pub simulated_seed: u64,

    /// The simulated scene changes every this many frames
    #[serde(default = "default_simulated_motion_interval")]
    pub simulated_motion_interval: u32,

    /// Simulated exposure time per frame, in milliseconds
    #[serde(default = "default_simulated_frame_interval_ms")]
    pub simulated_frame_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Directory that receives triggered captures
    #[serde(default = "default_capture_path")]
    pub path: PathBuf,
}

impl DetectorConfig {
    /// Minimum normalized change score that counts as motion
    pub fn trigger_floor(&self) -> f64 {
        let (width, height) = self.test_resolution;
        (width as u64 * height as u64 * 2) as f64 / 100.0
    }
}

impl MotionWatchConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("motionwatch.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("detector.threshold", default_threshold())?
            .set_default(
                "detector.test_resolution",
                vec![default_test_resolution().0, default_test_resolution().1],
            )?
            .set_default(
                "detector.capture_resolution",
                vec![
                    default_capture_resolution().0,
                    default_capture_resolution().1,
                ],
            )?
            .set_default("camera.backend", "gstreamer")?
            .set_default("camera.source", default_camera_source())?
            .set_default("camera.warmup_ms", default_warmup_ms())?
            .set_default("camera.capture_timeout_ms", default_capture_timeout_ms())?
            .set_default("camera.simulated_seed", default_simulated_seed())?
            .set_default(
                "camera.simulated_motion_interval",
                default_simulated_motion_interval(),
            )?
            .set_default(
                "camera.simulated_frame_interval_ms",
                default_simulated_frame_interval_ms(),
            )?
            .set_default("capture.path", ".")?
            .add_source(File::with_name(&path_str).required(false))
            // MOTIONWATCH_DETECTOR__THRESHOLD=40
            .add_source(
                Environment::with_prefix("MOTIONWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: MotionWatchConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (test_w, test_h) = self.detector.test_resolution;
        if test_w == 0 || test_h == 0 {
            return Err(ConfigError::Message(
                "Test resolution must be greater than 0".to_string(),
            ));
        }

        let (capture_w, capture_h) = self.detector.capture_resolution;
        if capture_w == 0 || capture_h == 0 {
            return Err(ConfigError::Message(
                "Capture resolution must be greater than 0".to_string(),
            ));
        }

        // A zero threshold divides the score by zero; 255 can never be exceeded
        if !(1..=254).contains(&self.detector.threshold) {
            return Err(ConfigError::Message(
                "Detector threshold must be between 1 and 254".to_string(),
            ));
        }

        if self.camera.capture_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Camera capture_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.camera.simulated_motion_interval == 0 {
            return Err(ConfigError::Message(
                "Camera simulated_motion_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as a TOML document
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for MotionWatchConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            camera: CameraConfig::default(),
            capture: CaptureConfig {
                path: default_capture_path(),
            },
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            test_resolution: default_test_resolution(),
            capture_resolution: default_capture_resolution(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: default_camera_backend(),
            source: default_camera_source(),
            warmup_ms: default_warmup_ms(),
            capture_timeout_ms: default_capture_timeout_ms(),
            simulated_seed: default_simulated_seed(),
            simulated_motion_interval: default_simulated_motion_interval(),
            simulated_frame_interval_ms: default_simulated_frame_interval_ms(),
        }
    }
}

// Default value functions
fn default_threshold() -> u32 {
    30
}
fn default_test_resolution() -> (u32, u32) {
    (1440, 1088)
}
fn default_capture_resolution() -> (u32, u32) {
    (2592, 1944)
}

fn default_camera_backend() -> CameraBackend {
    CameraBackend::Gstreamer
}
fn default_camera_source() -> String {
    "libcamerasrc".to_string()
}
fn default_warmup_ms() -> u64 {
    1000
}
fn default_capture_timeout_ms() -> u64 {
    5000
}
fn default_simulated_seed() -> u64 {
    12345
}
fn default_simulated_motion_interval() -> u32 {
    10
}
fn default_simulated_frame_interval_ms() -> u64 {
    200
}

fn default_capture_path() -> PathBuf {
    PathBuf::from(".")
}
