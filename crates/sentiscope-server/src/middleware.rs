use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID attached to every request as an extension and echoed on the
/// response.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Tag the request with the caller's `x-request-id`, or a fresh `UUIDv4`, and
/// echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    admitted: usize,
}

/// Fixed-window budget for classification requests, shared across the
/// process.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    budget: usize,
    period: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(budget: usize, period: Duration) -> Self {
        Self {
            budget,
            period,
            window: Arc::new(Mutex::new(Window {
                started_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    #[must_use]
    pub fn per_minute(budget: usize) -> Self {
        Self::new(budget, Duration::from_secs(60))
    }

    /// Admit one request, or return how long until the window resets.
    async fn try_admit(&self) -> Result<(), Duration> {
        let mut window = self.window.lock().await;
        let elapsed = window.started_at.elapsed();
        if elapsed >= self.period {
            window.started_at = Instant::now();
            window.admitted = 0;
        }

        if window.admitted >= self.budget {
            return Err(self.period.saturating_sub(window.started_at.elapsed()));
        }
        window.admitted += 1;
        Ok(())
    }
}

/// Reject requests past the window budget with `429 rate_limited` in the API
/// error envelope and a `retry-after` header in whole seconds.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let Err(retry_after) = rate_limit.try_admit().await else {
        return next.run(req).await;
    };

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let retry_secs = retry_after.as_secs().max(1);
    tracing::warn!(
        request_id = %request_id,
        budget = rate_limit.budget,
        retry_secs,
        "classification rate limit exceeded"
    );

    let mut res = ApiError::new(
        request_id,
        "rate_limited",
        format!(
            "more than {} classification requests in {}s; retry in {retry_secs}s",
            rate_limit.budget,
            rate_limit.period.as_secs()
        ),
    )
    .into_response();
    res.headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_secs));
    res
}
