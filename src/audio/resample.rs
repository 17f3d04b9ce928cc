//! Audio resampling and channel mixing utilities.
//!
//! whisper.cpp wants **16 kHz mono** audio.  This module provides the two
//! conversion steps:
//!
//! 1. [`stereo_to_mono`]: downmix any number of interleaved channels to mono.
//! 2. [`resample_to_16k`]: resample from any source rate to 16 000 Hz.
//!
//! Resampling goes through `rubato`'s windowed-sinc resampler (`SincFixedIn`,
//! `BlackmanHarris2`).  If rubato rejects the input the clip is resampled by
//! linear interpolation instead.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Rate whisper.cpp expects.
pub const TARGET_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`; `channels == 0` yields
/// an empty vector.
///
/// # Example
///
/// ```rust
/// use bridge_ai::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
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

/// Resample a whole mono clip from `source_rate` Hz to 16 000 Hz.
///
/// The output length is always `ceil(samples.len() * 16_000 / source_rate)`.
/// A 16 kHz or empty input is returned unchanged.
///
/// # Example
///
/// ```rust
/// use bridge_ai::audio::resample_to_16k;
///
/// let hi = vec![0.0_f32; 4_800];
/// let lo = resample_to_16k(&hi, 48_000);
/// assert_eq!(lo.len(), 1_600);
/// ```
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE || samples.is_empty() || source_rate == 0 {
        return samples.to_vec();
    }

    let ratio = TARGET_RATE as f64 / source_rate as f64;
    let expected = (samples.len() as f64 * ratio).ceil() as usize;

    match resample_sinc(samples, ratio, expected) {
        Ok(out) => out,
        Err(err) => {
            log::debug!("sinc resampler unavailable ({err}), using linear interpolation");
            resample_linear(samples, ratio, expected)
        }
    }
}

fn resample_sinc(samples: &[f32], ratio: f64, expected: usize) -> Result<Vec<f32>, String> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)
        .map_err(|e| e.to_string())?;
    let delay = resampler.output_delay();

    let mut out = resampler
        .process(&[samples], None)
        .map_err(|e| e.to_string())?
        .swap_remove(0);

    // Flush the filter tail so the last `delay` frames are not lost.
    let tail = resampler
        .process_partial(None::<&[Vec<f32>]>, None)
        .map_err(|e| e.to_string())?
        .swap_remove(0);
    out.extend(tail);

    let mut out: Vec<f32> = out.into_iter().skip(delay).take(expected).collect();
    out.resize(expected, 0.0);
    Ok(out)
}

/// Linear-interpolation resampler producing exactly `expected` samples.
fn resample_linear(samples: &[f32], ratio: f64, expected: usize) -> Vec<f32> {
    let mut output = Vec::with_capacity(expected);

    for i in 0..expected {
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
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- stereo_to_mono ----------------------------------------------------

    #[test]
    fn stereo_to_mono_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(stereo_to_mono(&input, 1), input);
    }

    #[test]
    fn stereo_to_mono_two_channel() {
        let out = stereo_to_mono(&[1.0_f32, -1.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stereo_to_mono_zero_channels() {
        assert!(stereo_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample_to_16k ---------------------------------------------------

    #[test]
    fn resample_already_16k_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        assert_eq!(resample_to_16k(&input, 16_000), input);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample_to_16k(&[], 48_000).is_empty());
    }

    #[test]
    fn resample_output_lengths() {
        assert_eq!(resample_to_16k(&vec![0.0_f32; 48_000], 48_000).len(), 16_000);
        assert_eq!(resample_to_16k(&vec![0.0_f32; 44_100], 44_100).len(), 16_000);
        assert_eq!(resample_to_16k(&vec![0.0_f32; 8_000], 8_000).len(), 16_000);
    }

    #[test]
    fn resample_constant_signal_keeps_level_away_from_edges() {
        let input = vec![0.5_f32; 48_000];
        let out = resample_to_16k(&input, 48_000);
        for &s in &out[2_000..14_000] {
            assert!((s - 0.5).abs() < 0.02, "amplitude drift: {s}");
        }
    }

    #[test]
    fn linear_resampler_matches_expected_length_and_level() {
        let input = vec![0.5_f32; 480];
        let out = resample_linear(&input, 16_000.0 / 48_000.0, 160);
        assert_eq!(out.len(), 160);
        assert!(out.iter().all(|s| (s - 0.5).abs() < 1e-5));

        let up = resample_linear(&[0.0, 1.0], 2.0, 4);
        assert_eq!(up, vec![0.0, 0.5, 1.0, 1.0]);
    }
}
