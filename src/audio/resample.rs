/// Linear-interpolation resampler.
///
/// For each output sample the fractional source position is
/// `i * (from_rate / to_rate)`; the result interpolates between the floor and
/// ceiling source samples by the fractional remainder. Output length is
/// `round(len * to_rate / from_rate)`. Resampling to the source rate is an
/// identity copy.
///
/// Not band-limited. Good enough for speech-recognition preprocessing; use a
/// windowed-sinc resampler if audio fidelity ever matters.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).round() as usize;
    let last = samples.len() - 1;

    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let floor = (pos.floor() as usize).min(last);
        let ceil = (floor + 1).min(last);
        let frac = (pos - pos.floor()) as f32;

        out.push(samples[floor] * (1.0 - frac) + samples[ceil] * frac);
    }

    out
}
