//! VADER (Valence Aware Dictionary and sEntiment Reasoner) backend.
//!
//! Scoring is delegated to the `vader_sentiment` crate, which embeds the
//! complete published valence and emoji lexicons and builds them once per
//! process. This module only rounds the output and maps it onto
//! [`Probabilities`].

use std::collections::HashMap;

use crate::error::SentimentError;
use crate::types::{Probabilities, Probability};

/// Output of [`VaderAnalyzer::polarity_scores`].
///
/// `pos`, `neg`, and `neu` are proportions of the text (rounded to three
/// decimals); `compound` is the normalized overall valence (four decimals).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl PolarityScores {
    fn from_raw(raw: &HashMap<&str, f64>) -> Self {
        let field = |key: &str| raw.get(key).copied().unwrap_or_default();
        Self {
            neg: round_to(field("neg"), 3),
            neu: round_to(field("neu"), 3),
            pos: round_to(field("pos"), 3),
            compound: round_to(field("compound"), 4),
        }
    }

    /// The positive and negative proportions as probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ProbabilityOutOfRange`] if a proportion
    /// falls outside `[0, 1]`.
    pub fn probabilities(&self) -> Result<Probabilities, SentimentError> {
        Ok(Probabilities::new(
            Some(Probability::new(self.pos)?),
            Some(Probability::new(self.neg)?),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VaderAnalyzer;

impl VaderAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        PolarityScores::from_raw(&analyzer.polarity_scores(text))
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
