use super::{MediaConverter, MediaError};
use crate::audio::{self, wav, Waveform};

/// Decode-once media conversion engine.
///
/// The source is demuxed and decoded up front; windows are then served as
/// 16-bit mono WAV slices at the source's native sample rate.
pub struct SymphoniaConverter {
    waveform: Waveform,
}

impl SymphoniaConverter {
    pub fn from_bytes(data: &[u8]) -> Result<Self, MediaError> {
        let waveform = audio::decode_bytes(data)?;

        tracing::debug!(
            samples = waveform.len(),
            sample_rate = waveform.sample_rate,
            duration_secs = waveform.duration_secs(),
            "Source audio decoded"
        );

        Ok(Self { waveform })
    }
}

impl MediaConverter for SymphoniaConverter {
    fn duration_secs(&self) -> f64 {
        self.waveform.duration_secs()
    }

    fn extract_window(&self, start_secs: f64, end_secs: f64) -> Result<Vec<u8>, MediaError> {
        let rate = self.waveform.sample_rate as f64;
        let len = self.waveform.len();
        let start = ((start_secs * rate).round() as usize).min(len);
        let end = ((end_secs * rate).round() as usize).min(len);

        if start >= end {
            return Err(MediaError::EmptyWindow {
                start: start_secs,
                end: end_secs,
            });
        }

        Ok(wav::encode_wav_f32(
            &self.waveform.samples[start..end],
            self.waveform.sample_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode_bytes;

    fn two_second_source() -> SymphoniaConverter {
        let samples: Vec<f32> = (0..16000).map(|i| ((i % 100) as f32 / 100.0) - 0.5).collect();
        let encoded = wav::encode_wav_f32(&samples, 8000);
        SymphoniaConverter::from_bytes(&encoded).unwrap()
    }

    #[test]
    fn test_reports_source_duration() {
        let converter = two_second_source();
        assert!((converter.duration_secs() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_serves_exact_windows_as_decodable_wav() {
        let converter = two_second_source();

        let window = converter.extract_window(0.0, 1.0).unwrap();
        let decoded = decode_bytes(&window).unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 8000);

        let tail = converter.extract_window(1.5, 2.0).unwrap();
        let decoded = decode_bytes(&tail).unwrap();
        assert_eq!(decoded.samples.len(), 4000);
    }

    #[test]
    fn test_window_clamps_to_source_end() {
        let converter = two_second_source();

        let window = converter.extract_window(1.5, 3.0).unwrap();
        let decoded = decode_bytes(&window).unwrap();
        assert_eq!(decoded.samples.len(), 4000);
    }

    #[test]
    fn test_window_past_the_end_is_empty() {
        let converter = two_second_source();

        let result = converter.extract_window(2.0, 3.0);
        assert!(matches!(result, Err(MediaError::EmptyWindow { .. })));
    }

    #[test]
    fn test_undecodable_source_is_an_error() {
        assert!(SymphoniaConverter::from_bytes(b"not a media file").is_err());
    }
}
