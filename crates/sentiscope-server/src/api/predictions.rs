use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use sentiscope_classifier::{
    BackendKind, BackendOutcome, BackendSelection, ClassifierInput, SentimentAggregator,
    SentimentError,
};
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

/// Per-request backend overrides; an absent flag keeps the server default.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PredictionQuery {
    pub vader: Option<bool>,
    pub neural: Option<bool>,
    pub domain: Option<bool>,
}

impl PredictionQuery {
    fn apply(&self, base: BackendSelection) -> BackendSelection {
        [
            (BackendKind::Vader, self.vader),
            (BackendKind::Neural, self.neural),
            (BackendKind::Domain, self.domain),
        ]
        .into_iter()
        .fold(base, |selection, (kind, flag)| match flag {
            Some(enabled) => selection.with(kind, enabled),
            None => selection,
        })
    }
}

pub(super) async fn create_prediction(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<PredictionQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<BackendOutcome>>, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    let input = ClassifierInput::from_json(&body)
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    let selection = query.apply(state.selection);
    let mut aggregator = SentimentAggregator::new(selection, &state.registry)
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?
        .with_policy(state.policy);

    let analysis = aggregator
        .classify(&input.text)
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    if !analysis.has_predictions() {
        let failed: Vec<_> = analysis
            .failures()
            .map(|f| format!("{}: {}", f.model, f.error))
            .collect();
        tracing::error!(request_id = %req_id.0, ?failed, "every sentiment backend failed");
        return Err(ApiError::new(
            req_id.0,
            "backend_unavailable",
            format!("every sentiment backend failed ({})", failed.join("; ")),
        ));
    }

    tracing::debug!(
        request_id = %req_id.0,
        backends = analysis.outcomes().len(),
        failures = analysis.failures().count(),
        "classified text"
    );
    Ok(Json(analysis.outcomes().to_vec()))
}

fn map_sentiment_error(request_id: String, error: &SentimentError) -> ApiError {
    match error {
        SentimentError::InvalidInput(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        SentimentError::Configuration(message) => {
            ApiError::new(request_id, "configuration_error", message.clone())
        }
        SentimentError::Backend { .. } => {
            tracing::error!(error = %error, "sentiment backend failed");
            ApiError::new(request_id, "backend_unavailable", error.to_string())
        }
        _ => {
            tracing::error!(error = %error, "classification failed");
            ApiError::new(request_id, "internal_error", "classification failed")
        }
    }
}
