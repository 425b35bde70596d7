//! Shared-secret check for protected routes.
//!
//! A request is let through when no secret is configured, when the `token`
//! query parameter matches, or when the `Authorization` header matches after
//! stripping an optional `Bearer` prefix.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Clone, Debug, Default)]
pub struct TokenGuard {
    secret: Option<Arc<str>>,
}

impl TokenGuard {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn authorize(
        &self,
        query: Option<&str>,
        authorization: Option<&str>,
    ) -> Result<(), ApiError> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        let query_match = query
            .and_then(query_token)
            .is_some_and(|token| token == secret);
        let header_match = authorization
            .map(strip_bearer)
            .is_some_and(|token| token == secret);

        if query_match || header_match {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

fn query_token(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

/// Drops a case-insensitive `Bearer` prefix and surrounding whitespace.
fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.get(..6), trimmed.get(6..)) {
        (Some(prefix), Some(rest))
            if prefix.eq_ignore_ascii_case("bearer")
                && (rest.is_empty() || rest.starts_with(char::is_whitespace)) =>
        {
            rest.trim()
        }
        _ => trimmed,
    }
}

pub async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Err(err) = state.guard.authorize(req.uri().query(), authorization) {
        warn!(path = %req.uri().path(), "rejected request without valid token");
        return Err(err);
    }

    Ok(next.run(req).await)
}
