mod predictions;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use sentiscope_classifier::{BackendKind, BackendRegistry, BackendSelection, FailurePolicy};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BackendRegistry>,
    /// Backends run when a request does not override the selection.
    pub selection: BackendSelection,
    pub policy: FailurePolicy,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    backends: Vec<BackendStatus>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct BackendStatus {
    model: &'static str,
    available: bool,
    enabled: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "bad_request" | "validation_error" | "configuration_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "backend_unavailable" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn classification_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/predictions", post(predictions::create_prediction))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(classification_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let backends: Vec<_> = BackendKind::ALL
        .into_iter()
        .map(|kind| BackendStatus {
            model: kind.model_name(),
            available: state.registry.is_available(kind),
            enabled: state.selection.is_enabled(kind),
        })
        .collect();

    let serving = backends.iter().any(|b| b.available && b.enabled);
    let status = if serving { "ok" } else { "degraded" };
    let code = if serving {
        StatusCode::OK
    } else {
        tracing::warn!("health check: no enabled backend is available");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ApiResponse {
            data: HealthData { status, backends },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}
