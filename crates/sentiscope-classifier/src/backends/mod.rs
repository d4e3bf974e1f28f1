//! Scoring backends consumed by the aggregator.
//!
//! Each backend turns text into a [`Probabilities`] pair. Handles are cheap to
//! clone (`Arc`) so the process-wide [`crate::BackendRegistry`] can hand them
//! to a fresh aggregator on every request.

mod domain;
mod neural;
mod vader;

use std::sync::Arc;

pub use domain::DomainLexicon;
pub use neural::NeuralClassifier;
pub use vader::{PolarityScores, VaderAnalyzer};

use crate::error::SentimentError;
use crate::types::{BackendKind, Probabilities};

#[derive(Debug, Clone)]
pub enum Backend {
    Vader(Arc<VaderAnalyzer>),
    Neural(Arc<NeuralClassifier>),
    Domain(Arc<DomainLexicon>),
    /// Selected, but absent from the registry; fails when scored.
    Unavailable(BackendKind),
}

impl Backend {
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Vader(_) => BackendKind::Vader,
            Backend::Neural(_) => BackendKind::Neural,
            Backend::Domain(_) => BackendKind::Domain,
            Backend::Unavailable(kind) => *kind,
        }
    }

    /// Score `text` with this backend.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] when the backend cannot produce in-range
    /// probabilities (network failure, malformed classifier response), or
    /// [`SentimentError::Unavailable`] for a backend with no handle.
    pub async fn score(&self, text: &str) -> Result<Probabilities, SentimentError> {
        match self {
            Backend::Vader(analyzer) => analyzer
                .polarity_scores(&flatten_lines(text))
                .probabilities(),
            Backend::Neural(classifier) => classifier.predict(text).await,
            Backend::Domain(lexicon) => lexicon.probabilities(text),
            Backend::Unavailable(kind) => {
                Err(SentimentError::Unavailable(kind.model_name().to_string()))
            }
        }
    }
}

/// Replace line breaks with spaces.
pub(crate) fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
