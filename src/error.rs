use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures the route generator surfaces to its callers.
///
/// Every variant carries a user-facing message and a `retryable` flag, which is
/// all the boundary layer needs to decide whether to offer a retry action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("routing provider rate limited the request")]
    RateLimited,

    #[error("routing provider returned no routes")]
    EmptyResult,

    /// Generic service failure (5xx, transport, timeout, malformed payload).
    #[error("routing provider unavailable: {0}")]
    Unavailable(String),

    #[error("no candidate passed strict or relaxed scoring")]
    NoViableCandidate,
}

impl RouteError {
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::RateLimited => "rate_limited",
            RouteError::EmptyResult => "empty_result",
            RouteError::Unavailable(_) => "unavailable",
            RouteError::NoViableCandidate => "no_viable_candidate",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RouteError::RateLimited => "Rate limited. Please wait a moment and try again.",
            RouteError::EmptyResult => {
                "No walkable routes found near this location. Try a different starting point."
            }
            RouteError::Unavailable(_) => "Routing service is temporarily unavailable.",
            RouteError::NoViableCandidate => {
                "Could not find a suitable route. Try adjusting your preferences or location."
            }
        }
    }

    /// Whether the caller should offer a retry. An empty result needs a
    /// different starting point, so retrying as-is is pointless.
    pub fn retryable(&self) -> bool {
        !matches!(self, RouteError::EmptyResult)
    }

    /// Whether a single fetch task should retry after this failure.
    pub fn retry_in_task(&self) -> bool {
        matches!(self, RouteError::Unavailable(_))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Route generation failed: {0}")]
    Route(#[from] RouteError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("History error: {0}")]
    History(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidRequest(ref e) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": e, "retryable": false }),
            ),
            // Core failures are a normal outcome for the UI, not an HTTP error
            AppError::Route(ref e) => {
                match e {
                    RouteError::Unavailable(detail) => {
                        tracing::error!("Route generation failed: {}", detail)
                    }
                    other => {
                        tracing::warn!(kind = other.kind(), "Route generation failed: {}", other)
                    }
                }
                (
                    StatusCode::OK,
                    json!({
                        "ok": false,
                        "error": e.message(),
                        "kind": e.kind(),
                        "retryable": e.retryable(),
                    }),
                )
            }
            AppError::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "ok": false,
                        "error": "Server configuration error.",
                        "retryable": false,
                    }),
                )
            }
            AppError::History(ref e) | AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": "Internal server error", "retryable": true }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
