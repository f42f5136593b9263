//! Conversion from raw capture buffers to recogniser input.
//!
//! Vosk wants **16 kHz mono `i16`** PCM.  Three steps get there from
//! whatever the microphone delivers:
//!
//! 1. [`downmix`] — average interleaved channels to mono.
//! 2. [`resample_to_16k`] — linear-interpolation resample to 16 000 Hz.
//! 3. [`to_i16_pcm`] — scale `[-1.0, 1.0]` floats to `i16` with clamping.
//!
//! Linear interpolation is plenty for command recognition from a metre
//! away; a windowed-sinc resampler would be overkill here.

/// Target rate required by the recogniser.
pub const TARGET_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// downmix
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging each
/// frame's channels.  Mono input is returned unchanged (owned); zero
/// channels yields an empty vector.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample_to_16k
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` Hz to 16 000 Hz by linear
/// interpolation.  A source already at 16 kHz is returned unchanged.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = TARGET_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };
        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// to_i16_pcm
// ---------------------------------------------------------------------------

/// Convert `[-1.0, 1.0]` floats to signed 16-bit PCM, clamping anything a
/// hot microphone pushes out of range.
pub fn to_i16_pcm(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
