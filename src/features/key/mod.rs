//! Key detection modules
//!
//! Detect musical key using:
//! - Krumhansl-Schmuckler templates (24 keys)
//! - Pearson correlation per frame
//! - Majority-vote smoothing over the last few accepted estimates

pub mod detector;
pub mod templates;

pub use detector::{detect_key, pearson_correlation, score_keys};
pub use templates::KeyTemplates;

use serde::Serialize;

use crate::analysis::result::Key;
use crate::features::chroma::ChromaVector;
use crate::features::history::History;

/// Capacity of the accepted-estimate history
pub const KEY_HISTORY: usize = 5;

/// Below this many stored estimates the latest one is returned unsmoothed
pub const MIN_VOTING_HISTORY: usize = 3;

/// Key estimate for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyEstimate {
    /// Estimated key (tonic and mode)
    pub key: Key,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,

    /// Chroma vector the estimate was computed from
    pub source_chroma: ChromaVector,
}

/// Frame-to-frame key estimator with history smoothing
///
/// While a key override is set the estimator is bypassed and reports the
/// forced key at full confidence. Releasing the override clears the history.
#[derive(Debug, Clone)]
pub struct KeyEstimator {
    templates: KeyTemplates,
    history: History<KeyEstimate>,
    override_key: Option<Key>,
}

impl KeyEstimator {
    /// Create an estimator with an empty history
    pub fn new() -> Self {
        Self {
            templates: KeyTemplates::new(),
            history: History::new(KEY_HISTORY),
            override_key: None,
        }
    }

    /// Feed one chroma vector and return the smoothed key
    ///
    /// Returns `None` when the frame's own estimate is rejected (silent chroma
    /// or too little confidence); the history is left untouched in that case.
    pub fn update(&mut self, chroma: &ChromaVector) -> Option<KeyEstimate> {
        if let Some(key) = self.override_key {
            return Some(KeyEstimate {
                key,
                confidence: 1.0,
                source_chroma: *chroma,
            });
        }

        let estimate = detect_key(chroma, &self.templates)?;
        self.history.push(estimate);
        self.smoothed()
    }

    /// Current smoothed key without feeding a new frame
    pub fn current(&self) -> Option<KeyEstimate> {
        match self.override_key {
            Some(key) => Some(KeyEstimate {
                key,
                confidence: 1.0,
                source_chroma: ChromaVector::silent(),
            }),
            None => self.smoothed(),
        }
    }

    /// Force a key, or release a previous override with `None`
    pub fn set_override(&mut self, key: Option<Key>) {
        match key {
            Some(key) => {
                log::debug!("Key override set to {}", key.name());
            }
            None if self.override_key.is_some() => {
                log::debug!("Key override released, clearing {} estimates", self.history.len());
                self.history.clear();
            }
            None => {}
        }
        self.override_key = key;
    }

    /// Active override, if any
    pub fn override_key(&self) -> Option<Key> {
        self.override_key
    }

    /// Accepted estimates, oldest first
    pub fn history(&self) -> &History<KeyEstimate> {
        &self.history
    }

    /// Clear the history and any override
    pub fn reset(&mut self) {
        self.history.clear();
        self.override_key = None;
    }

    fn smoothed(&self) -> Option<KeyEstimate> {
        let latest = *self.history.latest()?;
        if self.history.len() < MIN_VOTING_HISTORY {
            return Some(latest);
        }

        // walk newest to oldest so ties go to the most recent key
        let mut best: Option<(Key, usize)> = None;
        for estimate in self.history.iter().rev() {
            let votes = self.history.iter().filter(|e| e.key == estimate.key).count();
            if best.map_or(true, |(_, b)| votes > b) {
                best = Some((estimate.key, votes));
            }
        }
        let (key, votes) = best?;

        let confidence = (votes as f32 / KEY_HISTORY as f32 * latest.confidence).min(1.0);
        log::trace!(
            "Key vote: {} with {}/{} (conf {:.3})",
            key.name(),
            votes,
            self.history.len(),
            confidence
        );

        Some(KeyEstimate {
            key,
            confidence,
            source_chroma: latest.source_chroma,
        })
    }
}

impl Default for KeyEstimator {
    fn default() -> Self {
        Self::new()
    }
}
