//! Weighted word lexicon scorer.
//!
//! Sums per-word weights over the text and clamps the total to `[-1.0, 1.0]`.
//! The built-in table can be extended or overridden from a YAML file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SentimentError;
use crate::types::{Probabilities, Probability};

/// Built-in word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
const DEFAULT_WEIGHTS: &[(&str, f64)] = &[
    // Positive signals
    ("happy", 0.5),
    ("glad", 0.4),
    ("joy", 0.5),
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("wonderful", 0.5),
    ("positive", 0.4),
    ("love", 0.5),
    ("loved", 0.5),
    ("like", 0.2),
    ("best", 0.5),
    ("recommend", 0.4),
    ("quality", 0.3),
    ("delicious", 0.4),
    ("pleasant", 0.3),
    ("reliable", 0.3),
    ("safe", 0.3),
    ("thanks", 0.3),
    ("win", 0.4),
    ("success", 0.4),
    // Negative signals
    ("sad", -0.5),
    ("unhappy", -0.5),
    ("angry", -0.5),
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("hated", -0.6),
    ("disappointed", -0.5),
    ("broken", -0.4),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("concern", -0.3),
    ("warning", -0.4),
    ("dangerous", -0.6),
    ("harmful", -0.6),
    ("poor", -0.4),
];

/// On-disk shape of a lexicon override file.
///
/// ```yaml
/// words:
///   stellar: 0.6
///   meh: -0.2
/// ```
#[derive(Debug, Deserialize)]
struct LexiconFile {
    words: HashMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct DomainLexicon {
    weights: HashMap<String, f64>,
}

impl Default for DomainLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DomainLexicon {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|&(word, weight)| (word.to_string(), weight))
                .collect(),
        }
    }

    /// Load the built-in table extended with the words in a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `SentimentError` if the file cannot be read, parsed, or
    /// fails validation.
    pub fn from_yaml_file(path: &Path) -> Result<Self, SentimentError> {
        let content = std::fs::read_to_string(path).map_err(|e| SentimentError::LexiconIo {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut lexicon = Self::builtin();
        let added = lexicon.extend_from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            added,
            total = lexicon.len(),
            "loaded domain lexicon overrides"
        );
        Ok(lexicon)
    }

    /// Merge words from YAML content, overriding existing weights.
    ///
    /// Returns the number of words read from the content.
    ///
    /// # Errors
    ///
    /// Returns `SentimentError` if the YAML is malformed or a word is invalid.
    pub fn extend_from_yaml(&mut self, content: &str) -> Result<usize, SentimentError> {
        let file: LexiconFile = serde_yaml::from_str(content)?;
        validate_words(&file.words)?;

        let count = file.words.len();
        for (word, weight) in file.words {
            self.weights.insert(word.trim().to_lowercase(), weight);
        }
        Ok(count)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Score a text string using the lexicon.
    ///
    /// Splits text into lowercase words, sums matching weights, and clamps
    /// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
    #[must_use]
    pub fn score(&self, text: &str) -> f64 {
        let mut score = 0.0_f64;
        for word in text.split_whitespace() {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            if let Some(weight) = self.weights.get(&w) {
                score += weight;
            }
        }
        score.clamp(-1.0, 1.0)
    }

    /// Map the score onto a positive/negative probability pair.
    ///
    /// A score of `s` gives `pos = (1 + s) / 2` and `neg = 1 - pos`, so
    /// unknown text lands on an even split.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ProbabilityOutOfRange`] only if the clamped
    /// score maps outside `[0, 1]`.
    pub fn probabilities(&self, text: &str) -> Result<Probabilities, SentimentError> {
        let pos = (1.0 + self.score(text)) / 2.0;
        Ok(Probabilities::new(
            Some(Probability::new(pos)?),
            Some(Probability::new(1.0 - pos)?),
        ))
    }
}

fn validate_words(words: &HashMap<String, f64>) -> Result<(), SentimentError> {
    for (word, weight) in words {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return Err(SentimentError::LexiconValidation(
                "lexicon words must be non-empty".to_string(),
            ));
        }
        if trimmed.split_whitespace().count() > 1 {
            return Err(SentimentError::LexiconValidation(format!(
                "lexicon entry '{trimmed}' must be a single word"
            )));
        }
        if !(-1.0..=1.0).contains(weight) {
            return Err(SentimentError::LexiconValidation(format!(
                "weight {weight} for '{trimmed}' must be within [-1.0, 1.0]"
            )));
        }
    }
    Ok(())
}
