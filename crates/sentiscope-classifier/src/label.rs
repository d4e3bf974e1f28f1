//! Sentiment labels and the rule that derives one from a backend's probabilities.

use serde::{Deserialize, Serialize};

use crate::types::Probability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide a label from a backend's (possibly incomplete) probabilities.
///
/// - positive probability absent: `negative`
/// - negative probability absent: `positive`
/// - both present: `positive` only when `pos > neg`; ties are `negative`
///
/// Used identically for every backend.
#[must_use]
pub fn decide_label(pos: Option<Probability>, neg: Option<Probability>) -> Label {
    match (pos, neg) {
        (None, _) => Label::Negative,
        (Some(_), None) => Label::Positive,
        (Some(pos), Some(neg)) => {
            if pos.get() > neg.get() {
                Label::Positive
            } else {
                Label::Negative
            }
        }
    }
}
