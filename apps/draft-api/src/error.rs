use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Structured API error returned by the HTTP routes.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// Application-level error type that converts into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "FORBIDDEN".to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failures raised by session operations, mapped onto the gateway's
/// delivery rules rather than HTTP statuses.
///
/// `BadInput` and `Permission` are dropped after a debug log; `Shortage`
/// turns into a `message` notice to the owner; `Validation` rides back on
/// the pick acknowledgement; `Fatal` aborts the session's draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Malformed or out-of-range client event.
    BadInput(String),
    /// Non-owner attempted an owner-gated operation.
    Permission,
    /// Booster generation cannot satisfy its targets.
    Shortage(String),
    /// A pick/burn violated the draft rules.
    Validation(String),
    /// A programmer invariant was violated.
    Fatal(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadInput(msg) => write!(f, "bad input: {msg}"),
            Self::Permission => write!(f, "permission denied"),
            Self::Shortage(msg) => write!(f, "card shortage: {msg}"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Fatal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}
