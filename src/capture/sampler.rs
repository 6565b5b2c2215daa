use crate::capture::media::RawFrame;
use crate::error::AppError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// A JPEG snapshot of one video frame.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedFrame {
    /// Bare base64 payload, the form `/api/recognize` expects.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.to_base64())
    }
}

/// Copies the current frame of a stream and compresses it.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    quality: u8,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameSampler {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(80, 90),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// `None` is what a stream reads before it has buffered anything.
    pub fn sample(&self, frame: Option<RawFrame>) -> Result<EncodedFrame, AppError> {
        match frame {
            Some(frame) => self.encode(&frame),
            None => Err(AppError::FrameNotReady),
        }
    }

    pub fn encode(&self, frame: &RawFrame) -> Result<EncodedFrame, AppError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(AppError::FrameNotReady);
        }

        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.rgb.len() != expected {
            return Err(AppError::Encoding(format!(
                "frame buffer holds {} bytes, expected {expected}",
                frame.rgb.len()
            )));
        }

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality)
            .encode(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
            .map_err(|e| AppError::Encoding(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::Encoding("encoder produced no data".into()));
        }

        debug!(
            width = frame.width,
            height = frame.height,
            bytes = bytes.len(),
            "frame encoded"
        );

        Ok(EncodedFrame {
            bytes,
            width: frame.width,
            height: frame.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::media::{FacingMode, MediaDevice, MediaStream};
    use crate::capture::testing::{FakeDevice, gray_frame};

    #[test]
    fn encodes_native_resolution_jpeg() {
        let encoded = FrameSampler::default().encode(&gray_frame(16, 12)).unwrap();
        assert_eq!((encoded.width, encoded.height), (16, 12));
        assert_eq!(&encoded.bytes[..2], &[0xFF, 0xD8]);
        assert!(encoded.to_data_url().starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[test]
    fn refuses_stream_without_buffered_frame() {
        let mut stream = FakeDevice::unbuffered().open(FacingMode::User).unwrap();
        let err = FrameSampler::default().sample(stream.read_frame().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::FrameNotReady));
    }

    #[test]
    fn short_buffer_is_an_encoding_error() {
        let mut frame = gray_frame(4, 4);
        frame.rgb.truncate(10);
        let err = FrameSampler::default().encode(&frame).unwrap_err();
        assert!(matches!(err, AppError::Encoding(_)));
    }

    #[test]
    fn quality_is_kept_in_range() {
        assert_eq!(FrameSampler::new(30).quality(), 80);
        assert_eq!(FrameSampler::new(100).quality(), 90);
    }
}
