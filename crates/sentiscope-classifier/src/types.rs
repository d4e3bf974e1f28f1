use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::label::{decide_label, Label};

/// A probability in `[0, 1]`.
///
/// Construction rejects values outside the range (and NaN), so every
/// probability that reaches a [`BackendResult`] is in bounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// # Errors
    ///
    /// Returns [`SentimentError::ProbabilityOutOfRange`] if `value` is not in `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, SentimentError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SentimentError::ProbabilityOutOfRange(value))
        }
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Probability {
    type Error = SentimentError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

/// The positive/negative probabilities reported by one backend.
///
/// Either side may be absent when the backend's native output only carries
/// one label (a top-1 classifier, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub pos: Option<Probability>,
    pub neg: Option<Probability>,
}

impl Probabilities {
    #[must_use]
    pub fn new(pos: Option<Probability>, neg: Option<Probability>) -> Self {
        Self { pos, neg }
    }

    /// Build from two raw floats.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ProbabilityOutOfRange`] if either value is
    /// outside `[0, 1]`.
    pub fn both(pos: f64, neg: f64) -> Result<Self, SentimentError> {
        Ok(Self {
            pos: Some(Probability::new(pos)?),
            neg: Some(Probability::new(neg)?),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos.is_none() && self.neg.is_none()
    }
}

/// One backend's normalized verdict. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBackendResult")]
pub struct BackendResult {
    model: String,
    probs: Probabilities,
    label: Label,
}

impl BackendResult {
    /// Build a result, deriving the label with [`decide_label`].
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::MissingProbabilities`] if both probabilities
    /// are absent.
    pub fn new(model: impl Into<String>, probs: Probabilities) -> Result<Self, SentimentError> {
        let model = model.into();
        if probs.is_empty() {
            return Err(SentimentError::MissingProbabilities { model });
        }
        Ok(Self {
            label: decide_label(probs.pos, probs.neg),
            model,
            probs,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn probs(&self) -> Probabilities {
        self.probs
    }

    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }
}

/// Wire shape accepted when deserializing a [`BackendResult`]; validated
/// before it becomes one.
#[derive(Deserialize)]
struct RawBackendResult {
    model: String,
    probs: Probabilities,
    label: Label,
}

impl TryFrom<RawBackendResult> for BackendResult {
    type Error = SentimentError;

    fn try_from(raw: RawBackendResult) -> Result<Self, Self::Error> {
        let result = BackendResult::new(raw.model, raw.probs)?;
        if result.label != raw.label {
            return Err(SentimentError::LabelMismatch {
                model: result.model,
                label: raw.label.to_string(),
            });
        }
        Ok(result)
    }
}

/// A backend that failed while the aggregator isolated failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFailure {
    pub model: String,
    pub error: String,
}

/// What one backend contributed to an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackendOutcome {
    Scored(BackendResult),
    Failed(BackendFailure),
}

impl BackendOutcome {
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            BackendOutcome::Scored(result) => result.model(),
            BackendOutcome::Failed(failure) => &failure.model,
        }
    }

    #[must_use]
    pub fn as_result(&self) -> Option<&BackendResult> {
        match self {
            BackendOutcome::Scored(result) => Some(result),
            BackendOutcome::Failed(_) => None,
        }
    }
}

/// The scoring backends, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Vader,
    Neural,
    Domain,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Vader, BackendKind::Neural, BackendKind::Domain];

    /// Name reported in the `model` field of results.
    #[must_use]
    pub fn model_name(self) -> &'static str {
        match self {
            BackendKind::Vader => "VADER",
            BackendKind::Neural => "NEURAL",
            BackendKind::Domain => "DOMAIN",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.model_name())
    }
}

/// Which backends an aggregator runs. Defaults to all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackendSelection {
    pub vader: bool,
    pub neural: bool,
    pub domain: bool,
}

impl Default for BackendSelection {
    fn default() -> Self {
        Self {
            vader: true,
            neural: true,
            domain: true,
        }
    }
}

impl BackendSelection {
    #[must_use]
    pub fn none() -> Self {
        Self {
            vader: false,
            neural: false,
            domain: false,
        }
    }

    #[must_use]
    pub fn only(kind: BackendKind) -> Self {
        Self::none().with(kind, true)
    }

    #[must_use]
    pub fn with(mut self, kind: BackendKind, enabled: bool) -> Self {
        match kind {
            BackendKind::Vader => self.vader = enabled,
            BackendKind::Neural => self.neural = enabled,
            BackendKind::Domain => self.domain = enabled,
        }
        self
    }

    #[must_use]
    pub fn is_enabled(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Vader => self.vader,
            BackendKind::Neural => self.neural,
            BackendKind::Domain => self.domain,
        }
    }

    /// Enabled backends in invocation order.
    pub fn enabled(&self) -> impl Iterator<Item = BackendKind> + '_ {
        BackendKind::ALL
            .into_iter()
            .filter(move |kind| self.is_enabled(*kind))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled().next().is_none()
    }
}

/// How [`crate::analyze`] reacts to a failing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep scoring with the remaining backends.
    #[default]
    Isolate,
    /// Abort on the first failure; nothing from the call is kept.
    FailFast,
}

/// Settings for building a [`crate::BackendRegistry`].
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub classifier_url: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub domain_lexicon_path: Option<PathBuf>,
    pub selection: BackendSelection,
    pub policy: FailurePolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            classifier_url: None,
            timeout_secs: 30,
            user_agent: "sentiscope/0.1 (sentiment-aggregation)".to_string(),
            domain_lexicon_path: None,
            selection: BackendSelection::default(),
            policy: FailurePolicy::default(),
        }
    }
}

impl ClassifierConfig {
    #[must_use]
    pub fn from_app_config(config: &sentiscope_core::AppConfig) -> Self {
        Self {
            classifier_url: config.classifier_url.clone(),
            timeout_secs: config.classifier_timeout_secs,
            user_agent: config.classifier_user_agent.clone(),
            domain_lexicon_path: config.domain_lexicon_path.clone(),
            selection: BackendSelection {
                vader: config.enable_vader,
                neural: config.enable_neural,
                domain: config.enable_domain,
            },
            policy: if config.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Isolate
            },
        }
    }
}
