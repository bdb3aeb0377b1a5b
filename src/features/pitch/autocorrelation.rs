//! Monophonic pitch estimation by normalized autocorrelation
//!
//! # Algorithm
//!
//! 1. Compute `r(τ) = Σ x[i]·x[i+τ]` for every lag between `sample_rate / max_hz`
//!    and `sample_rate / min_pitch_hz`, normalized by `r(0)`
//! 2. Take the lag with the highest normalized correlation
//! 3. Refine the lag by fitting a parabola through its neighbours
//! 4. Convert to frequency: `f0 = sample_rate / lag`
//!
//! The correlation at the chosen lag is the confidence. When the maximum sits
//! on the shortest lag (low tones, chords without a common period in range)
//! the result lands above the accepted range and is dropped; the spectral
//! peaks still cover those frames.

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Correlation below which no pitch is reported
pub const MIN_CORRELATION: f32 = 0.2;

/// Lag search bounds and acceptance range
#[derive(Debug, Clone, Copy)]
pub struct AutocorrelationParams {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Lowest pitch to search for (sets the longest lag)
    pub min_pitch_hz: f32,
    /// Accepted frequency range `[min, max]`; `max` also sets the shortest lag
    pub min_detect_hz: f32,
    /// Upper edge of the accepted range
    pub max_detect_hz: f32,
}

/// Estimate the fundamental of `samples`
///
/// Returns `(frequency_hz, confidence)` or `None` when the signal is silent,
/// too short, not periodic enough, or the result falls outside the accepted
/// range.
///
/// # Example
///
/// ```
/// use stratum_live::features::pitch::autocorrelation::{estimate_pitch, AutocorrelationParams};
///
/// let samples: Vec<f32> = (0..2048)
///     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin())
///     .collect();
/// let params = AutocorrelationParams {
///     sample_rate: 44100,
///     min_pitch_hz: 80.0,
///     min_detect_hz: 50.0,
///     max_detect_hz: 2000.0,
/// };
/// let (freq, confidence) = estimate_pitch(&samples, &params).unwrap();
/// assert!((freq - 220.0).abs() < 2.0);
/// assert!(confidence > 0.8);
/// ```
pub fn estimate_pitch(samples: &[f32], params: &AutocorrelationParams) -> Option<(f32, f32)> {
    let n = samples.len();
    if n < 4 || params.sample_rate == 0 {
        return None;
    }

    let sr = params.sample_rate as f32;
    let energy: f32 = samples.iter().map(|&x| x * x).sum();
    if !energy.is_finite() || energy <= EPSILON {
        return None;
    }

    let min_lag = ((sr / params.max_detect_hz).floor() as usize).max(1);
    let max_lag = ((sr / params.min_pitch_hz).ceil() as usize).min(n - 2);
    if min_lag + 2 > max_lag {
        return None;
    }

    let correlation: Vec<f32> = (min_lag..=max_lag)
        .map(|lag| {
            let sum: f32 = samples[..n - lag]
                .iter()
                .zip(&samples[lag..])
                .map(|(a, b)| a * b)
                .sum();
            sum / energy
        })
        .collect();

    let (best_idx, best_corr) = correlation
        .iter()
        .copied()
        .enumerate()
        .fold((0usize, f32::MIN), |acc, (i, c)| if c > acc.1 { (i, c) } else { acc });

    if !best_corr.is_finite() || best_corr < MIN_CORRELATION {
        log::trace!("Autocorrelation peak {:.3} below threshold", best_corr);
        return None;
    }

    let refined_lag = (min_lag + best_idx) as f32 + parabolic_offset(&correlation, best_idx);
    let frequency = sr / refined_lag;

    if !frequency.is_finite()
        || frequency < params.min_detect_hz
        || frequency > params.max_detect_hz
    {
        return None;
    }

    Some((frequency, best_corr.clamp(0.0, 1.0)))
}

/// Sub-sample offset of a peak at `idx`, in `[-0.5, 0.5]`
pub(crate) fn parabolic_offset(values: &[f32], idx: usize) -> f32 {
    if idx == 0 || idx + 1 >= values.len() {
        return 0.0;
    }
    let (a, b, c) = (values[idx - 1], values[idx], values[idx + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < EPSILON {
        return 0.0;
    }
    (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
}
