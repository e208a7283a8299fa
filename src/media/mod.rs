mod converter;

pub use converter::SymphoniaConverter;

use thiserror::Error;

use crate::audio::DecodeError;

/// Media conversion engine: trims a `[start, end)` window out of the source
/// recording and returns it as a decodable audio buffer.
///
/// Failures here are collaborator-level and fatal to segmentation; the
/// transcription pipeline never retries them.
pub trait MediaConverter: Send + Sync {
    /// Total duration of the source recording's audio, in seconds.
    fn duration_secs(&self) -> f64;

    /// Extract the audio covering exactly `[start_secs, end_secs)`.
    fn extract_window(&self, start_secs: f64, end_secs: f64) -> Result<Vec<u8>, MediaError>;
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("window [{start:.2}s, {end:.2}s) contains no audio")]
    EmptyWindow { start: f64, end: f64 },
}
