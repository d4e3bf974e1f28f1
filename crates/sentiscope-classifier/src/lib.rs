//! Multi-backend sentiment classification for sentiscope.
//!
//! Runs a piece of text through every enabled scoring backend (a VADER-style
//! rule-based analyzer, a TEI-hosted neural classifier, and a weighted domain
//! lexicon), normalizes each backend's output into a [`BackendResult`], and
//! decides a label with [`decide_label`] when a backend reports only one of
//! the two probabilities.

pub mod aggregator;
pub mod backends;
pub mod error;
pub mod label;
pub mod registry;
pub mod schema;
pub mod types;

pub use aggregator::{analyze, Analysis, SentimentAggregator};
pub use backends::{Backend, DomainLexicon, NeuralClassifier, PolarityScores, VaderAnalyzer};
pub use error::SentimentError;
pub use label::{decide_label, Label};
pub use registry::BackendRegistry;
pub use schema::{validate_output, ClassifierInput};
pub use types::{
    BackendFailure, BackendKind, BackendOutcome, BackendResult, BackendSelection, ClassifierConfig,
    FailurePolicy, Probabilities, Probability,
};
