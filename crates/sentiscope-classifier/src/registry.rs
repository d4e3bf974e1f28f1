//! Process-wide backend handles.
//!
//! Built once at startup; each request clones the `Arc`s it needs into a
//! fresh [`crate::SentimentAggregator`].

use std::sync::Arc;

use crate::backends::{Backend, DomainLexicon, NeuralClassifier, VaderAnalyzer};
use crate::error::SentimentError;
use crate::types::{BackendKind, BackendSelection, ClassifierConfig};

#[derive(Debug, Clone)]
pub struct BackendRegistry {
    vader: Arc<VaderAnalyzer>,
    neural: Option<Arc<NeuralClassifier>>,
    domain: Arc<DomainLexicon>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::offline()
    }
}

impl BackendRegistry {
    /// Registry with the in-process backends only; the neural backend is
    /// unavailable until [`BackendRegistry::with_neural`] is called.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            vader: Arc::new(VaderAnalyzer::new()),
            neural: None,
            domain: Arc::new(DomainLexicon::builtin()),
        }
    }

    /// Build every backend the configuration makes available.
    ///
    /// # Errors
    ///
    /// Returns `SentimentError` if the domain lexicon file cannot be loaded or
    /// the classifier HTTP client cannot be built.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, SentimentError> {
        let mut registry = Self::offline();

        if let Some(path) = &config.domain_lexicon_path {
            registry = registry.with_domain_lexicon(DomainLexicon::from_yaml_file(path)?);
        }

        match &config.classifier_url {
            Some(url) => {
                let classifier =
                    NeuralClassifier::new(url, config.timeout_secs, &config.user_agent)?;
                tracing::info!(endpoint = classifier.endpoint(), "neural classifier configured");
                registry = registry.with_neural(classifier);
            }
            None => tracing::info!("no classifier URL configured; neural backend unavailable"),
        }

        Ok(registry)
    }

    #[must_use]
    pub fn with_neural(mut self, classifier: NeuralClassifier) -> Self {
        self.neural = Some(Arc::new(classifier));
        self
    }

    #[must_use]
    pub fn with_domain_lexicon(mut self, lexicon: DomainLexicon) -> Self {
        self.domain = Arc::new(lexicon);
        self
    }

    /// Handle for `kind`, or `None` when that backend is not available.
    #[must_use]
    pub fn backend(&self, kind: BackendKind) -> Option<Backend> {
        match kind {
            BackendKind::Vader => Some(Backend::Vader(Arc::clone(&self.vader))),
            BackendKind::Neural => self.neural.as_ref().map(|n| Backend::Neural(Arc::clone(n))),
            BackendKind::Domain => Some(Backend::Domain(Arc::clone(&self.domain))),
        }
    }

    #[must_use]
    pub fn is_available(&self, kind: BackendKind) -> bool {
        kind != BackendKind::Neural || self.neural.is_some()
    }

    /// Available backends in invocation order.
    #[must_use]
    pub fn available(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .filter(|kind| self.is_available(*kind))
            .collect()
    }

    /// Narrow `selection` to the backends this registry can serve, logging a
    /// warning for each one dropped.
    #[must_use]
    pub fn available_selection(&self, selection: BackendSelection) -> BackendSelection {
        selection
            .enabled()
            .filter(|kind| !self.is_available(*kind))
            .fold(selection, |narrowed, kind| {
                tracing::warn!(backend = %kind, "backend enabled but unavailable; disabling it");
                narrowed.with(kind, false)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_registry_lacks_neural() {
        let registry = BackendRegistry::offline();
        assert!(registry.backend(BackendKind::Neural).is_none());
        assert_eq!(
            registry.available(),
            vec![BackendKind::Vader, BackendKind::Domain]
        );
    }

    #[test]
    fn with_neural_makes_all_available() {
        let classifier = NeuralClassifier::new("http://tei.local", 5, "test").unwrap();
        let registry = BackendRegistry::offline().with_neural(classifier);
        assert_eq!(registry.available(), BackendKind::ALL.to_vec());
        assert_eq!(
            registry.backend(BackendKind::Neural).map(|b| b.kind()),
            Some(BackendKind::Neural)
        );
    }

    #[test]
    fn available_selection_drops_unavailable_backends() {
        let registry = BackendRegistry::offline();
        let narrowed = registry.available_selection(BackendSelection::default());
        assert_eq!(
            narrowed,
            BackendSelection::default().with(BackendKind::Neural, false)
        );
        assert!(registry
            .available_selection(BackendSelection::only(BackendKind::Neural))
            .is_empty());
    }

    #[test]
    fn from_config_without_url_is_offline() {
        let registry = BackendRegistry::from_config(&ClassifierConfig::default()).unwrap();
        assert!(!registry.is_available(BackendKind::Neural));
    }

    #[test]
    fn from_config_propagates_lexicon_errors() {
        let config = ClassifierConfig {
            domain_lexicon_path: Some("/nonexistent/lexicon.yaml".into()),
            ..ClassifierConfig::default()
        };
        assert!(matches!(
            BackendRegistry::from_config(&config),
            Err(SentimentError::LexiconIo { .. })
        ));
    }
}
