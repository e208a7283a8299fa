use crate::transcribe::TranscriptionResult;

/// Segment transcriptions are separated by a blank line.
const SEGMENT_SEPARATOR: &str = "\n\n";

/// Concatenate per-segment transcriptions into the final transcript.
///
/// Results arrive in index order (the service contract guarantees it); no
/// overlap removal or text normalization is attempted.
pub fn assemble_transcript(results: &[TranscriptionResult]) -> String {
    results
        .iter()
        .map(|result| result.transcription.as_str())
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}
