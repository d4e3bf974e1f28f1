//! The sentiment aggregator.
//!
//! [`analyze`] runs a fixed list of backends over one text and returns a
//! fresh, immutable [`Analysis`]. [`SentimentAggregator`] wraps it with the
//! backend selection chosen at construction and keeps the most recent
//! analysis readable after the call.

use crate::backends::Backend;
use crate::error::SentimentError;
use crate::registry::BackendRegistry;
use crate::types::{
    BackendFailure, BackendKind, BackendOutcome, BackendResult, BackendSelection, FailurePolicy,
};

/// The outcome of classifying one text, one entry per backend in
/// invocation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    text: String,
    outcomes: Vec<BackendOutcome>,
}

impl Analysis {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn outcomes(&self) -> &[BackendOutcome] {
        &self.outcomes
    }

    /// Backends that produced a result.
    pub fn predictions(&self) -> impl Iterator<Item = &BackendResult> {
        self.outcomes.iter().filter_map(BackendOutcome::as_result)
    }

    /// Backends that failed under [`FailurePolicy::Isolate`].
    pub fn failures(&self) -> impl Iterator<Item = &BackendFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BackendOutcome::Failed(failure) => Some(failure),
            BackendOutcome::Scored(_) => None,
        })
    }

    #[must_use]
    pub fn has_predictions(&self) -> bool {
        self.predictions().next().is_some()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Score `text` with every backend in order.
///
/// # Errors
///
/// Under [`FailurePolicy::FailFast`], returns [`SentimentError::Backend`] for
/// the first backend that fails; nothing scored earlier in the call is kept.
/// Under [`FailurePolicy::Isolate`] this never fails: failing backends are
/// recorded as [`BackendOutcome::Failed`].
pub async fn analyze(
    backends: &[Backend],
    text: &str,
    policy: FailurePolicy,
) -> Result<Analysis, SentimentError> {
    let mut outcomes = Vec::with_capacity(backends.len());

    for backend in backends {
        let model = backend.kind().model_name();
        let scored = backend
            .score(text)
            .await
            .and_then(|probs| BackendResult::new(model, probs));

        match scored {
            Ok(result) => {
                tracing::debug!(model, label = %result.label(), "backend scored text");
                outcomes.push(BackendOutcome::Scored(result));
            }
            Err(e) => match policy {
                FailurePolicy::FailFast => {
                    tracing::error!(model, error = %e, "backend failed; aborting classification");
                    return Err(SentimentError::Backend {
                        model: model.to_string(),
                        source: Box::new(e),
                    });
                }
                FailurePolicy::Isolate => {
                    tracing::warn!(model, error = %e, "backend failed; continuing with remaining backends");
                    outcomes.push(BackendOutcome::Failed(BackendFailure {
                        model: model.to_string(),
                        error: e.to_string(),
                    }));
                }
            },
        }
    }

    Ok(Analysis {
        text: text.to_string(),
        outcomes,
    })
}

/// Runs the selected backends over submitted text and holds the latest
/// analysis.
///
/// Intended to be built once per classification request. Reusing an instance
/// replaces the previous analysis and logs a warning.
#[derive(Debug)]
pub struct SentimentAggregator {
    backends: Vec<Backend>,
    policy: FailurePolicy,
    text: Option<String>,
    analysis: Option<Analysis>,
}

impl SentimentAggregator {
    /// Build an aggregator for the backends enabled in `selection`.
    ///
    /// A selected backend missing from `registry` does not fail here; it
    /// fails each time it is scored, like any other backend error.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Configuration`] if no backend is enabled.
    pub fn new(
        selection: BackendSelection,
        registry: &BackendRegistry,
    ) -> Result<Self, SentimentError> {
        if selection.is_empty() {
            return Err(SentimentError::Configuration(
                "no sentiment backend enabled; include at least one backend".to_string(),
            ));
        }

        let backends = selection
            .enabled()
            .map(|kind| {
                registry.backend(kind).unwrap_or_else(|| {
                    tracing::debug!(backend = %kind, "selected backend has no handle");
                    Backend::Unavailable(kind)
                })
            })
            .collect();

        Ok(Self {
            backends,
            policy: FailurePolicy::default(),
            text: None,
            analysis: None,
        })
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Enabled backends in invocation order.
    pub fn backends(&self) -> impl Iterator<Item = BackendKind> + '_ {
        self.backends.iter().map(Backend::kind)
    }

    /// Classify `text` with every enabled backend.
    ///
    /// If this aggregator already holds a text, the previous analysis is
    /// discarded with a warning before the new text is scored. A held empty
    /// string counts as a previous text, so reusing after `""` also warns.
    ///
    /// # Errors
    ///
    /// Propagates [`analyze`] errors. After a failed call the aggregator
    /// holds the new text but no analysis.
    pub async fn classify(&mut self, text: &str) -> Result<&Analysis, SentimentError> {
        if let Some(previous) = self.text.as_deref() {
            tracing::warn!(
                previous_chars = previous.chars().count(),
                "overwriting previous analysis"
            );
        }
        self.analysis = None;
        self.text = Some(text.to_string());

        let analysis = analyze(&self.backends, text, self.policy).await?;
        Ok(&*self.analysis.insert(analysis))
    }

    /// The most recently submitted text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The analysis produced by the last successful [`classify`](Self::classify).
    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Per-backend outcomes of the last successful classification.
    #[must_use]
    pub fn predictions(&self) -> Option<&[BackendOutcome]> {
        self.analysis.as_ref().map(Analysis::outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{decide_label, Label};

    fn offline() -> BackendRegistry {
        BackendRegistry::offline()
    }

    fn offline_selection() -> BackendSelection {
        BackendSelection::default().with(BackendKind::Neural, false)
    }

    #[test]
    fn every_non_empty_selection_constructs() {
        let registry = offline();
        let mut constructed = 0;
        for vader in [false, true] {
            for neural in [false, true] {
                for domain in [false, true] {
                    let selection = BackendSelection {
                        vader,
                        neural,
                        domain,
                    };
                    let result = SentimentAggregator::new(selection, &registry);
                    if selection.is_empty() {
                        assert!(matches!(result, Err(SentimentError::Configuration(_))));
                    } else {
                        let aggregator = result.unwrap_or_else(|e| {
                            panic!("selection {selection:?} should construct: {e}")
                        });
                        assert!(aggregator.backends().eq(selection.enabled()));
                        constructed += 1;
                    }
                }
            }
        }
        assert_eq!(constructed, 7);
    }

    #[test]
    fn empty_selection_is_a_configuration_error() {
        let err = SentimentAggregator::new(BackendSelection::none(), &offline()).unwrap_err();
        assert!(matches!(err, SentimentError::Configuration(_)));
    }

    #[tokio::test]
    async fn unavailable_backend_is_recorded_as_a_failure() {
        let mut aggregator =
            SentimentAggregator::new(BackendSelection::default(), &offline()).unwrap();
        let analysis = aggregator.classify("happy").await.unwrap();

        let models: Vec<_> = analysis.outcomes().iter().map(BackendOutcome::model).collect();
        assert_eq!(models, vec!["VADER", "NEURAL", "DOMAIN"]);
        let failures: Vec<_> = analysis.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].model, "NEURAL");
        assert!(failures[0].error.contains("not available"), "got: {}", failures[0].error);
    }

    #[tokio::test]
    async fn unavailable_backend_aborts_under_fail_fast() {
        let mut aggregator = SentimentAggregator::new(BackendSelection::default(), &offline())
            .unwrap()
            .with_policy(FailurePolicy::FailFast);
        let err = aggregator.classify("happy").await.unwrap_err();

        assert!(
            matches!(
                err,
                SentimentError::Backend { ref model, ref source }
                    if model == "NEURAL" && matches!(**source, SentimentError::Unavailable(_))
            ),
            "got: {err}"
        );
        assert!(aggregator.analysis().is_none());
    }

    #[tokio::test]
    async fn empty_previous_text_still_warns_and_resets() {
        let mut aggregator = SentimentAggregator::new(offline_selection(), &offline()).unwrap();
        aggregator.classify("").await.unwrap();
        assert_eq!(aggregator.text(), Some(""));

        aggregator.classify("happy").await.unwrap();
        assert_eq!(aggregator.analysis().map(Analysis::text), Some("happy"));
    }

    #[test]
    fn new_aggregator_holds_nothing() {
        let aggregator = SentimentAggregator::new(offline_selection(), &offline()).unwrap();
        assert!(aggregator.text().is_none());
        assert!(aggregator.analysis().is_none());
        assert!(aggregator.predictions().is_none());
        assert_eq!(aggregator.policy(), FailurePolicy::Isolate);
    }

    #[tokio::test]
    async fn classify_yields_one_result_per_backend_in_order() {
        let mut aggregator = SentimentAggregator::new(offline_selection(), &offline()).unwrap();
        let analysis = aggregator.classify("happy").await.unwrap();

        let models: Vec<_> = analysis.outcomes().iter().map(BackendOutcome::model).collect();
        assert_eq!(models, vec!["VADER", "DOMAIN"]);
        for result in analysis.predictions() {
            let probs = result.probs();
            assert_eq!(result.label(), decide_label(probs.pos, probs.neg));
            assert_eq!(result.label(), Label::Positive);
        }
    }

    #[tokio::test]
    async fn empty_text_is_accepted() {
        let mut aggregator = SentimentAggregator::new(offline_selection(), &offline()).unwrap();
        let analysis = aggregator.classify("").await.unwrap();
        assert_eq!(analysis.outcomes().len(), 2);
        assert!(analysis.predictions().all(|r| r.label() == Label::Negative));
    }

    #[tokio::test]
    async fn second_classify_replaces_first() {
        let mut aggregator = SentimentAggregator::new(offline_selection(), &offline()).unwrap();
        aggregator.classify("happy").await.unwrap();
        aggregator.classify("sad").await.unwrap();

        assert_eq!(aggregator.text(), Some("sad"));
        let analysis = aggregator.analysis().unwrap();
        assert_eq!(analysis.text(), "sad");
        assert_eq!(analysis.outcomes().len(), 2);
        assert!(analysis.predictions().all(|r| r.label() == Label::Negative));
    }

    #[tokio::test]
    async fn analyze_with_no_backends_is_empty() {
        let analysis = analyze(&[], "happy", FailurePolicy::Isolate).await.unwrap();
        assert!(analysis.outcomes().is_empty());
        assert!(!analysis.has_predictions());
        assert!(analysis.is_complete());
    }
}
