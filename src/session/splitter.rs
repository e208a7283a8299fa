use thiserror::Error;

use super::AudioSegment;
use crate::media::{MediaConverter, MediaError};

pub const DEFAULT_SLICE_DURATION_SECS: f64 = 10.0;

/// Cuts a recording into fixed-length segments via the media conversion
/// engine. Every slice is `slice_duration_secs` long except the final one,
/// which is truncated to the recording's remaining length.
pub struct AudioSplitter {
    slice_duration_secs: f64,
}

impl AudioSplitter {
    pub fn new() -> Self {
        Self {
            slice_duration_secs: DEFAULT_SLICE_DURATION_SECS,
        }
    }

    pub fn with_slice_duration(slice_duration_secs: f64) -> Self {
        let slice_duration_secs = if slice_duration_secs > 0.0 {
            slice_duration_secs
        } else {
            DEFAULT_SLICE_DURATION_SECS
        };
        Self {
            slice_duration_secs,
        }
    }

    pub fn split(
        &self,
        converter: &dyn MediaConverter,
        source_name: &str,
    ) -> Result<Vec<AudioSegment>, SplitError> {
        let duration = converter.duration_secs();
        if duration <= 0.0 {
            return Err(SplitError::EmptySource);
        }

        let count = (duration / self.slice_duration_secs).ceil() as usize;
        let stem = file_stem(source_name);

        tracing::info!(
            source = source_name,
            duration_secs = duration,
            segments = count,
            "Splitting source audio"
        );

        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let start_time = i as f64 * self.slice_duration_secs;
            let end_time = (start_time + self.slice_duration_secs).min(duration);
            let index = i as u32 + 1;

            let buffer = converter.extract_window(start_time, end_time)?;
            let file_name = format!("{}_segment_{:03}.wav", stem, index);

            segments.push(AudioSegment::new(
                buffer, file_name, start_time, end_time, index,
            ));
        }

        Ok(segments)
    }
}

impl Default for AudioSplitter {
    fn default() -> Self {
        Self::new()
    }
}

fn file_stem(source_name: &str) -> &str {
    source_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(source_name)
}

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("source recording contains no audio")]
    EmptySource,

    #[error(transparent)]
    Media(#[from] MediaError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockConverter {
        duration: f64,
        windows: Mutex<Vec<(f64, f64)>>,
        fail: bool,
    }

    impl MockConverter {
        fn with_duration(duration: f64) -> Self {
            Self {
                duration,
                windows: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    impl MediaConverter for MockConverter {
        fn duration_secs(&self) -> f64 {
            self.duration
        }

        fn extract_window(&self, start_secs: f64, end_secs: f64) -> Result<Vec<u8>, MediaError> {
            if self.fail {
                return Err(MediaError::EmptyWindow {
                    start: start_secs,
                    end: end_secs,
                });
            }
            self.windows.lock().unwrap().push((start_secs, end_secs));
            Ok(vec![0u8; 4])
        }
    }

    #[test]
    fn test_twenty_five_seconds_yields_three_segments_with_truncated_tail() {
        let converter = MockConverter::with_duration(25.0);
        let segments = AudioSplitter::new().split(&converter, "talk.mp4").unwrap();

        assert_eq!(segments.len(), 3);
        let windows: Vec<(f64, f64)> = segments.iter().map(|s| (s.start_time, s.end_time)).collect();
        assert_eq!(windows, vec![(0.0, 10.0), (10.0, 20.0), (20.0, 25.0)]);

        let indices: Vec<u32> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);

        assert_eq!(segments[0].file_name, "talk_segment_001.wav");
        assert_eq!(segments[2].file_name, "talk_segment_003.wav");
        assert!((segments[2].duration_secs() - 5.0).abs() < 1e-9);

        assert_eq!(*converter.windows.lock().unwrap(), windows);
    }

    #[test]
    fn test_exact_multiple_has_no_truncated_tail() {
        let converter = MockConverter::with_duration(20.0);
        let segments = AudioSplitter::new().split(&converter, "talk.wav").unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].end_time, 20.0);
    }

    #[test]
    fn test_custom_slice_duration() {
        let converter = MockConverter::with_duration(12.0);
        let segments = AudioSplitter::with_slice_duration(5.0)
            .split(&converter, "clip.ogg")
            .unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].start_time, 10.0);
        assert_eq!(segments[2].end_time, 12.0);
    }

    #[test]
    fn test_empty_source_is_fatal() {
        let converter = MockConverter::with_duration(0.0);
        let result = AudioSplitter::new().split(&converter, "silent.wav");

        assert!(matches!(result, Err(SplitError::EmptySource)));
    }

    #[test]
    fn test_converter_failure_propagates() {
        let mut converter = MockConverter::with_duration(25.0);
        converter.fail = true;

        let result = AudioSplitter::new().split(&converter, "talk.mp4");
        assert!(matches!(result, Err(SplitError::Media(_))));
    }
}
