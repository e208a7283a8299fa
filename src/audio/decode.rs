use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::Waveform;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no audio track found")]
    NoAudioTrack,

    #[error("unknown sample rate")]
    UnknownSampleRate,

    #[error("no audio samples decoded")]
    Empty,

    #[error("audio decoding failed: {0}")]
    Failed(String),
}

/// Decode an encoded audio buffer into a mono waveform at its native sample
/// rate. Multi-channel input is downmixed by averaging the channels.
pub fn decode_bytes(data: &[u8]) -> Result<Waveform, DecodeError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let hint = Hint::new();
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| DecodeError::Failed(format!("probe: {}", e)))?;

    let mut format = probed.format;

    let track = format.default_track().ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &decoder_opts)
        .map_err(|e| DecodeError::Failed(format!("codec: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(DecodeError::Failed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(DecodeError::Failed(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let interleaved = sample_buf.samples();

        if channels > 1 {
            for frame in interleaved.chunks(channels) {
                let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                samples.push(mono);
            }
        } else {
            samples.extend_from_slice(interleaved);
        }
    }

    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(Waveform {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav;

    #[test]
    fn test_round_trips_encoded_wav() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0) - 0.5).collect();
        let encoded = wav::encode_wav_f32(&samples, 16000);

        let waveform = decode_bytes(&encoded).unwrap();

        assert_eq!(waveform.sample_rate, 16000);
        assert_eq!(waveform.samples.len(), 1000);
        for (decoded, original) in waveform.samples.iter().zip(&samples) {
            assert!(
                (decoded - original).abs() < 2.0 / 32768.0,
                "decoded {} vs original {}",
                decoded,
                original
            );
        }
    }

    #[test]
    fn test_downmixes_stereo_by_averaging() {
        let mut interleaved = Vec::new();
        for _ in 0..100 {
            interleaved.push(8000i16);
            interleaved.push(16000i16);
        }
        let encoded = wav::encode_wav_i16(&interleaved, 44100, 2);

        let waveform = decode_bytes(&encoded).unwrap();

        assert_eq!(waveform.sample_rate, 44100);
        assert_eq!(waveform.samples.len(), 100);
        let expected = 12000.0 / 32768.0;
        for sample in &waveform.samples {
            assert!((sample - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        assert!(decode_bytes(b"definitely not an audio container").is_err());
    }

    #[test]
    fn test_silent_zero_length_data_is_an_error() {
        let encoded = wav::encode_wav_i16(&[], 16000, 1);
        assert!(decode_bytes(&encoded).is_err());
    }
}
