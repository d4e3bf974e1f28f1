use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// The aggregator was asked to run with no usable backend.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The text to classify was missing or not a string.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),

    #[error("backend {model} returned neither a positive nor a negative probability")]
    MissingProbabilities { model: String },

    #[error("label '{label}' for backend {model} does not follow from its probabilities")]
    LabelMismatch { model: String, label: String },

    /// A backend failed while scoring; carries the backend's model name.
    #[error("backend {model} failed: {source}")]
    Backend {
        model: String,
        #[source]
        source: Box<SentimentError>,
    },

    /// The backend was selected but no handle for it was configured.
    #[error("backend {0} is not available")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("failed to read lexicon file {path}: {source}")]
    LexiconIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon parse error: {0}")]
    LexiconParse(#[from] serde_yaml::Error),

    #[error("lexicon validation error: {0}")]
    LexiconValidation(String),

    #[error("schema error: {0}")]
    Schema(String),
}
