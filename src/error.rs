use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WhaleWatchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Cannot normalize {field}: {reason}")]
    Normalization { field: &'static str, reason: String },

    #[error("No usable transactions in batch")]
    EmptyBatch,

    #[error("Live source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),
}

impl WhaleWatchError {
    pub fn normalization(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Normalization {
            field,
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WhaleWatchError::Transport(_)
            | WhaleWatchError::UpstreamStatus(_)
            | WhaleWatchError::MalformedPayload(_)
            | WhaleWatchError::EmptyBatch => "UPSTREAM_ERROR",
            WhaleWatchError::Normalization { .. } => "NORMALIZATION_ERROR",
            WhaleWatchError::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            WhaleWatchError::UnknownToken(_) => "UNKNOWN_TOKEN",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            WhaleWatchError::UnknownToken(_) => StatusCode::NOT_FOUND,
            WhaleWatchError::Transport(_)
            | WhaleWatchError::UpstreamStatus(_)
            | WhaleWatchError::MalformedPayload(_)
            | WhaleWatchError::EmptyBatch => StatusCode::BAD_GATEWAY,
            WhaleWatchError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WhaleWatchError::Normalization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for WhaleWatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, error_code = error_code, "Request failed");
        } else {
            tracing::debug!(error = %self, error_code = error_code, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_token_maps_to_not_found() {
        let response = WhaleWatchError::UnknownToken("DOGE".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn every_variant_has_a_mapped_status() {
        let cases = [
            (WhaleWatchError::UpstreamStatus(500), StatusCode::BAD_GATEWAY),
            (WhaleWatchError::EmptyBatch, StatusCode::BAD_GATEWAY),
            (
                WhaleWatchError::SourceUnavailable("offline".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                WhaleWatchError::normalization("amount", "bad"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn upstream_failures_share_a_code() {
        assert_eq!(WhaleWatchError::UpstreamStatus(503).error_code(), "UPSTREAM_ERROR");
        assert_eq!(WhaleWatchError::EmptyBatch.error_code(), "UPSTREAM_ERROR");
        assert_eq!(
            WhaleWatchError::MalformedPayload("no data".into()).error_code(),
            "UPSTREAM_ERROR"
        );
    }

    #[test]
    fn normalization_message_names_the_field() {
        let err = WhaleWatchError::normalization("amount", "not a number");
        assert_eq!(err.to_string(), "Cannot normalize amount: not a number");
    }
}
