//! WAV decoding for uploaded answers.
//!
//! The gateway receives whole files, so everything here works on byte
//! slices. Output is always mono f32 at [`WHISPER_SAMPLE_RATE`].

mod error;

pub use error::AudioError;

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use tracing::debug;

use crate::constants::WHISPER_SAMPLE_RATE;

/// Decodes WAV bytes into mono f32 samples at the Whisper sample rate.
pub fn decode_wav(bytes: &[u8]) -> Result<Vec<f32>, AudioError> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    if channels == 0 {
        return Err(AudioError::UnsupportedChannels {
            channels: spec.channels,
        });
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().filter_map(|s| s.ok()).collect(),
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    if samples.is_empty() {
        return Err(AudioError::Empty);
    }

    let mono = downmix_mono(&samples, channels);
    let resampled = resample(&mono, spec.sample_rate, WHISPER_SAMPLE_RATE);

    debug!(
        input_rate = spec.sample_rate,
        channels,
        samples = resampled.len(),
        "Decoded answer audio"
    );

    Ok(resampled)
}

fn downmix_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler. Whisper is tolerant of the artifacts
/// this introduces on speech, so a polyphase filter is not warranted here.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let a = samples[idx];
        let b = samples.get(idx + 1).copied().unwrap_or(a);
        out.push(a + (b - a) * frac);
    }

    out
}
