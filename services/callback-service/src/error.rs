use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::Envelope;
use crate::store::StoreError;

/// Every failure a client can observe, rendered as a `{code, msg}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: invalid or missing token")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("failed to persist callback")]
    Persistence(#[from] StoreError),
    #[error("failed to render dashboard")]
    Render(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Persistence(err) => tracing::error!(error = %err, "callback persistence failed"),
            Self::Render(detail) => tracing::error!(error = %detail, "dashboard render failed"),
            Self::Unauthorized | Self::NotFound => {}
        }
        let body = Envelope::message(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_envelope_codes() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Render("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_are_client_facing() {
        assert_eq!(ApiError::NotFound.to_string(), "not found");
        assert!(ApiError::Unauthorized.to_string().starts_with("Unauthorized"));
    }
}
