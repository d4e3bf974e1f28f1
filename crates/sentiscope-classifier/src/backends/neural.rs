//! TEI (Text Embeddings Inference) client for a hosted sequence classifier.
//!
//! The classifier model is loaded once by the inference server; this client
//! only holds a pooled HTTP connection and is shared across requests.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::label::Label;
use crate::types::{Probabilities, Probability};

#[derive(Debug)]
pub struct NeuralClassifier {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl NeuralClassifier {
    /// Create a client for the `/predict` endpoint under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// Classify `text` and pick out the positive and negative scores.
    ///
    /// Labels are matched case-insensitively (`POSITIVE`, `pos`, ...). A label
    /// the model did not return leaves that probability absent.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Classifier`] if the request fails, the server
    /// answers with a non-success status, the body cannot be parsed, or it
    /// carries neither a positive nor a negative label. Returns
    /// [`SentimentError::ProbabilityOutOfRange`] for a score outside `[0, 1]`.
    pub async fn predict(&self, text: &str) -> Result<Probabilities, SentimentError> {
        let request = PredictRequest {
            inputs: text,
            truncate: true,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SentimentError::Classifier(format!("TEI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::Classifier(format!(
                "TEI returned status {}",
                response.status()
            )));
        }

        let scores: Vec<LabelScore> = response
            .json()
            .await
            .map_err(|e| SentimentError::Classifier(format!("TEI response parse error: {e}")))?;

        extract_probabilities(&scores)
    }
}

fn polarity_of(label: &str) -> Option<Label> {
    match label.trim().to_ascii_lowercase().as_str() {
        "positive" | "pos" => Some(Label::Positive),
        "negative" | "neg" => Some(Label::Negative),
        _ => None,
    }
}

fn extract_probabilities(scores: &[LabelScore]) -> Result<Probabilities, SentimentError> {
    let mut pos = None;
    let mut neg = None;

    for entry in scores {
        match polarity_of(&entry.label) {
            Some(Label::Positive) if pos.is_none() => pos = Some(Probability::new(entry.score)?),
            Some(Label::Negative) if neg.is_none() => neg = Some(Probability::new(entry.score)?),
            Some(_) => {}
            None => tracing::debug!(label = %entry.label, "ignoring non-polarity classifier label"),
        }
    }

    let probs = Probabilities::new(pos, neg);
    if probs.is_empty() {
        return Err(SentimentError::Classifier(
            "TEI response carried neither a positive nor a negative label".to_string(),
        ));
    }
    Ok(probs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, score: f64) -> LabelScore {
        LabelScore {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn extracts_both_labels_case_insensitively() {
        let probs =
            extract_probabilities(&[entry("POSITIVE", 0.97), entry("Negative", 0.03)]).unwrap();
        assert_eq!(probs.pos.map(Probability::get), Some(0.97));
        assert_eq!(probs.neg.map(Probability::get), Some(0.03));
    }

    #[test]
    fn top_one_output_leaves_other_side_absent() {
        let probs = extract_probabilities(&[entry("NEGATIVE", 0.88)]).unwrap();
        assert!(probs.pos.is_none());
        assert_eq!(probs.neg.map(Probability::get), Some(0.88));
    }

    #[test]
    fn unrelated_labels_are_ignored() {
        let probs =
            extract_probabilities(&[entry("neutral", 0.6), entry("pos", 0.3)]).unwrap();
        assert_eq!(probs.pos.map(Probability::get), Some(0.3));
        assert!(probs.neg.is_none());
    }

    #[test]
    fn no_polarity_label_is_an_error() {
        let err = extract_probabilities(&[entry("neutral", 1.0)]).unwrap_err();
        assert!(matches!(err, SentimentError::Classifier(_)));
    }

    #[test]
    fn out_of_range_score_is_an_error() {
        let err = extract_probabilities(&[entry("positive", 3.2)]).unwrap_err();
        assert!(matches!(err, SentimentError::ProbabilityOutOfRange(_)));
    }

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let classifier = NeuralClassifier::new("http://tei.local:8080/", 5, "test").unwrap();
        assert_eq!(classifier.endpoint(), "http://tei.local:8080/predict");
    }
}
