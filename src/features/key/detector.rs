//! Key detection algorithm
//!
//! Correlates one chroma vector against the 24 Krumhansl-Schmuckler key
//! templates and keeps the best match.
//!
//! # Reference
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*. Oxford
//! University Press. (Key-finding algorithm due to Krumhansl & Schmuckler.)

use super::templates::KeyTemplates;
use super::KeyEstimate;
use crate::analysis::result::{Key, Mode};
use crate::features::chroma::ChromaVector;

/// Chroma vectors summing below this carry no usable tonality
pub const MIN_CHROMA_SUM: f32 = 0.01;

/// Estimates below this confidence are discarded
pub const MIN_KEY_CONFIDENCE: f32 = 0.05;

/// Pearson correlation coefficient of two 12-element vectors
///
/// Returns 0.0 when either vector has zero variance.
pub fn pearson_correlation(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    let mean_a = a.iter().sum::<f32>() / 12.0;
    let mean_b = b.iter().sum::<f32>() / 12.0;

    let mut cov = 0.0f32;
    let mut var_a = 0.0f32;
    let mut var_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= 1e-12 || var_b <= 1e-12 {
        return 0.0;
    }
    let denom = (var_a * var_b).sqrt();
    if !denom.is_finite() {
        return 0.0;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Correlation of `chroma` with all 24 keys, ranked highest first
///
/// Majors come before minors (and lower roots before higher) among equal
/// scores.
pub fn score_keys(chroma: &ChromaVector, templates: &KeyTemplates) -> Vec<(Key, f32)> {
    let mut scores = Vec::with_capacity(24);
    for mode in [Mode::Major, Mode::Minor] {
        for root in 0..12 {
            let template = templates.template(root, mode);
            scores.push((Key::new(root, mode), pearson_correlation(&chroma.values, &template)));
        }
    }
    // stable sort keeps the enumeration order for ties
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores
}

/// Detect the key of a single chroma vector
///
/// Returns `None` for a near-silent chroma vector or when the best
/// correlation maps to a confidence below [`MIN_KEY_CONFIDENCE`].
///
/// # Example
///
/// ```
/// use stratum_live::analysis::result::{Key, Mode};
/// use stratum_live::features::chroma::ChromaVector;
/// use stratum_live::features::key::{detect_key, templates::{KeyTemplates, MAJOR_PROFILE}};
///
/// let chroma = ChromaVector::from_energies(MAJOR_PROFILE);
/// let estimate = detect_key(&chroma, &KeyTemplates::new()).unwrap();
/// assert_eq!(estimate.key, Key::new(0, Mode::Major));
/// ```
pub fn detect_key(chroma: &ChromaVector, templates: &KeyTemplates) -> Option<KeyEstimate> {
    if chroma.sum() < MIN_CHROMA_SUM {
        return None;
    }

    let (key, best) = score_keys(chroma, templates).into_iter().next()?;
    let confidence = ((best + 1.0) / 2.0).clamp(0.0, 1.0);
    if confidence < MIN_KEY_CONFIDENCE {
        log::trace!("Key {} rejected: confidence {:.3}", key.name(), confidence);
        return None;
    }

    Some(KeyEstimate {
        key,
        confidence,
        source_chroma: *chroma,
    })
}
