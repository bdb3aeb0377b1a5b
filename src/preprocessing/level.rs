//! Time-domain level measurements

/// Level reported for silent or unusable frames, in dB
pub const SILENCE_DB: f32 = -90.0;

/// RMS of a sample buffer; non-finite samples count as zero
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples
        .iter()
        .map(|&x| if x.is_finite() { x * x } else { 0.0 })
        .sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// RMS level in dB (`20·log10(rms)`), floored at [`SILENCE_DB`]
///
/// # Example
///
/// ```
/// use stratum_live::preprocessing::level::{rms_db, SILENCE_DB};
///
/// assert_eq!(rms_db(&[0.0; 128]), SILENCE_DB);
/// assert!((rms_db(&[0.5; 128]) + 6.02).abs() < 0.01);
/// ```
pub fn rms_db(samples: &[f32]) -> f32 {
    let value = rms(samples);
    if value <= 0.0 || !value.is_finite() {
        return SILENCE_DB;
    }
    (20.0 * value.log10()).max(SILENCE_DB)
}

/// Fraction of adjacent sample pairs whose sign differs
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / (samples.len() - 1) as f32
}
