use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use seo_rewriter::{RewriteError, TransportErrorKind};

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "validation_error",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: message.into(),
        }
    }

    pub fn from_rejection(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<RewriteError> for ApiError {
    fn from(err: RewriteError) -> Self {
        let (status, code) = match &err {
            RewriteError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            RewriteError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
            RewriteError::Transport { kind, .. } => match kind {
                TransportErrorKind::QuotaExceeded => (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded"),
                TransportErrorKind::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                TransportErrorKind::Authentication => (StatusCode::BAD_GATEWAY, "authentication_failed"),
                TransportErrorKind::Other => (StatusCode::BAD_GATEWAY, "provider_error"),
            },
            RewriteError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            log::error!("Request failed: {}", err);
        }

        Self {
            status,
            code,
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
