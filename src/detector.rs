use crate::config::DetectorConfig;
use crate::error::DetectorError;
use crate::frame::Frame;

/// Channel count the change score is normalized by
pub const SCORE_CHANNELS: usize = 4;

/// Result of comparing the two most recent test frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionScore {
    /// Samples whose absolute change exceeds the threshold
    pub changed_samples: usize,
    /// `changed_samples / 4 / threshold`
    pub num_triggers: f64,
    /// Floor `num_triggers` must strictly exceed
    pub trigger_floor: f64,
}

impl MotionScore {
    pub fn is_motion(&self) -> bool {
        self.num_triggers > self.trigger_floor
    }

    /// Integer part of the score, as reported in diagnostics
    pub fn pixels_changed(&self) -> u64 {
        self.num_triggers.trunc() as u64
    }
}

/// Pixel-difference scoring between two frames
#[derive(Debug, Clone)]
pub struct MotionDetector {
    config: DetectorConfig,
    trigger_floor: f64,
}

impl MotionDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let trigger_floor = config.trigger_floor();
        Self {
            config,
            trigger_floor,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    pub fn trigger_floor(&self) -> f64 {
        self.trigger_floor
    }

    /// Count samples whose absolute difference exceeds the threshold.
    ///
    /// Buffers of different lengths are rejected rather than compared partially.
    pub fn count_changed_samples(&self, oldest: &[u8], newest: &[u8]) -> Result<usize, DetectorError> {
        if oldest.len() != newest.len() {
            return Err(DetectorError::FrameSizeMismatch {
                oldest: oldest.len(),
                newest: newest.len(),
            });
        }

        let threshold = self.config.threshold;
        let count = oldest
            .iter()
            .zip(newest)
            .filter(|&(&old, &new)| (i32::from(new) - i32::from(old)).unsigned_abs() > threshold)
            .count();

        Ok(count)
    }

    /// Normalize a changed-sample count into the decision statistic
    pub fn num_triggers(&self, changed_samples: usize) -> f64 {
        changed_samples as f64 / SCORE_CHANNELS as f64 / self.config.threshold as f64
    }

    /// Score a pair of frames, oldest first
    pub fn score(&self, oldest: &Frame, newest: &Frame) -> Result<MotionScore, DetectorError> {
        let changed_samples = self.count_changed_samples(oldest.data(), newest.data())?;

        Ok(MotionScore {
            changed_samples,
            num_triggers: self.num_triggers(changed_samples),
            trigger_floor: self.trigger_floor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameFormat;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::time::SystemTime;

    fn rgba_frame(id: u64, width: u32, height: u32, data: Vec<u8>) -> Frame {
        Frame::new(id, SystemTime::now(), data, width, height, FrameFormat::Rgba)
    }

    fn random_buffer(seed: u64, len: usize) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = vec![0u8; len];
        rng.fill_bytes(&mut data);
        data
    }

    fn small_detector(threshold: u32) -> MotionDetector {
        MotionDetector::new(DetectorConfig {
            threshold,
            test_resolution: (10, 10),
            capture_resolution: (20, 20),
        })
    }

    #[test]
    fn test_identical_frames_score_zero() {
        let detector = small_detector(30);
        let data = random_buffer(7, 10 * 10 * 4);
        let oldest = rgba_frame(1, 10, 10, data.clone());
        let newest = rgba_frame(2, 10, 10, data);

        let score = detector.score(&oldest, &newest).unwrap();
        assert_eq!(score.changed_samples, 0);
        assert_eq!(score.num_triggers, 0.0);
        assert!(!score.is_motion());
    }

    #[test]
    fn test_every_sample_changed() {
        let detector = small_detector(30);
        let oldest = rgba_frame(1, 10, 10, vec![0u8; 400]);
        let newest = rgba_frame(2, 10, 10, vec![200u8; 400]);

        let score = detector.score(&oldest, &newest).unwrap();
        assert_eq!(score.changed_samples, 400);
        assert_eq!(score.num_triggers, 400.0 / 4.0 / 30.0);
    }

    #[test]
    fn test_difference_does_not_wrap() {
        let detector = small_detector(30);

        // 10 - 250 would wrap to 16 with unsigned arithmetic
        assert_eq!(detector.count_changed_samples(&[250], &[10]).unwrap(), 1);
        assert_eq!(detector.count_changed_samples(&[10], &[250]).unwrap(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let detector = small_detector(30);

        assert_eq!(detector.count_changed_samples(&[100], &[130]).unwrap(), 0);
        assert_eq!(detector.count_changed_samples(&[100], &[131]).unwrap(), 1);
        assert_eq!(detector.count_changed_samples(&[131], &[100]).unwrap(), 1);
    }

    #[test]
    fn test_decision_boundary() {
        // 10x10 test resolution gives a floor of exactly 2.0
        let detector = small_detector(1);
        assert_eq!(detector.trigger_floor(), 2.0);

        let oldest = vec![0u8; 400];
        let mut at_floor = vec![0u8; 400];
        at_floor[..8].fill(2);
        let score = detector
            .score(&rgba_frame(1, 10, 10, oldest.clone()), &rgba_frame(2, 10, 10, at_floor))
            .unwrap();
        assert_eq!(score.num_triggers, 2.0);
        assert!(!score.is_motion());

        let mut above_floor = vec![0u8; 400];
        above_floor[..9].fill(2);
        let score = detector
            .score(&rgba_frame(1, 10, 10, oldest), &rgba_frame(3, 10, 10, above_floor))
            .unwrap();
        assert_eq!(score.num_triggers, 2.25);
        assert!(score.is_motion());
    }

    #[test]
    fn test_size_mismatch_fails_fast() {
        let detector = small_detector(30);
        let oldest = rgba_frame(1, 10, 10, vec![0u8; 400]);
        let newest = rgba_frame(2, 10, 10, vec![0u8; 396]);

        assert_eq!(
            detector.score(&oldest, &newest),
            Err(DetectorError::FrameSizeMismatch {
                oldest: 400,
                newest: 396
            })
        );
    }

    #[test]
    fn test_default_resolution_identical_random_frames() {
        let detector = MotionDetector::new(DetectorConfig::default());
        let len = 1440 * 1088 * 4;
        let oldest = rgba_frame(1, 1440, 1088, random_buffer(12345, len));
        let newest = rgba_frame(2, 1440, 1088, random_buffer(12345, len));

        let score = detector.score(&oldest, &newest).unwrap();
        assert_eq!(score.changed_samples, 0);
        assert_eq!(score.pixels_changed(), 0);
        assert!((score.trigger_floor - 31334.4).abs() < 1e-9);
        assert!(!score.is_motion());
    }

    #[test]
    fn test_default_resolution_independent_random_frames() {
        let detector = MotionDetector::new(DetectorConfig::default());
        let len = 1440 * 1088 * 4;
        let oldest = rgba_frame(1, 1440, 1088, random_buffer(12345, len));
        let newest = rgba_frame(2, 1440, 1088, random_buffer(11111, len));

        let score = detector.score(&oldest, &newest).unwrap();

        // Uniform independent bytes differ by more than 30 with p = 50850/65536
        let expected = len as f64 * 50850.0 / 65536.0;
        assert!((score.changed_samples as f64 - expected).abs() < expected * 0.01);
        assert!(score.is_motion());
        assert_eq!(score.pixels_changed(), (score.changed_samples / 4 / 30) as u64);
    }
}
