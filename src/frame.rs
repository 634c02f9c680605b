use std::time::SystemTime;

use crate::error::DetectorError;

/// Pixel layout of a raw frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// 8-bit red, green, blue, alpha
    Rgba,
    /// 8-bit red, green, blue
    Rgb24,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgba => 4,
            FrameFormat::Rgb24 => 3,
        }
    }

    /// Caps format name understood by GStreamer
    pub fn caps_name(&self) -> &'static str {
        match self {
            FrameFormat::Rgba => "RGBA",
            FrameFormat::Rgb24 => "RGB",
        }
    }
}

/// Raw low-resolution frame used for change detection.
///
/// The pixel buffer is private and never mutated after construction.
#[derive(Debug)]
pub struct Frame {
    id: u64,
    timestamp: SystemTime,
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: FrameFormat,
}

impl Frame {
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data,
            width,
            height,
            format,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Flat sample buffer, row-major, interleaved channels
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Buffer length implied by the declared geometry and format
    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// Fail with [`DetectorError::InvalidFrame`] if the buffer does not match its geometry
    pub fn ensure_valid(&self) -> Result<(), DetectorError> {
        if self.validate_size() {
            Ok(())
        } else {
            Err(DetectorError::InvalidFrame {
                frame_id: self.id,
                expected: self.expected_size(),
                actual: self.data.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_format_properties() {
        assert_eq!(FrameFormat::Rgba.bytes_per_pixel(), 4);
        assert_eq!(FrameFormat::Rgb24.bytes_per_pixel(), 3);
        assert_eq!(FrameFormat::Rgba.caps_name(), "RGBA");
    }

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(
            7,
            SystemTime::now(),
            vec![0u8; 64 * 48 * 4],
            64,
            48,
            FrameFormat::Rgba,
        );

        assert_eq!(frame.id(), 7);
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.len(), 64 * 48 * 4);
        assert!(frame.validate_size());
        assert!(frame.ensure_valid().is_ok());
    }

    #[test]
    fn test_frame_size_validation() {
        let frame = Frame::new(
            3,
            SystemTime::now(),
            vec![0u8; 100],
            64,
            48,
            FrameFormat::Rgba,
        );

        assert!(!frame.validate_size());
        assert_eq!(
            frame.ensure_valid(),
            Err(DetectorError::InvalidFrame {
                frame_id: 3,
                expected: 64 * 48 * 4,
                actual: 100,
            })
        );
    }
}
