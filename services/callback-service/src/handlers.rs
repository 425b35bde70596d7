use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::{
        header::{CONTENT_TYPE, USER_AGENT},
        HeaderMap, StatusCode,
    },
    response::Html,
    Json,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::dashboard;
use crate::error::ApiError;
use crate::models::{CallbackRecord, Envelope};
use crate::probe::CallbackSummary;
use crate::state::AppState;

/// Largest callback body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub async fn ingest_callback(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let user_agent = header_str(&headers, USER_AGENT.as_str()).map(str::to_string);
    let payload = parse_payload(&headers, &body);

    let record = CallbackRecord::new(ip, user_agent, payload);
    let id = record.id.clone();
    let summary = CallbackSummary::probe(&record.payload);

    state.store.append(record).await?;

    info!(
        id = %id,
        status = %summary.status,
        task_id = %summary.task_id,
        download_url = %summary.download_url,
        "callback received"
    );

    Ok(Json(Envelope::ok()))
}

pub async fn list_callbacks(
    State(state): State<AppState>,
) -> Json<Envelope<Vec<CallbackRecord>>> {
    let callbacks = state.store.list().await;
    debug!(count = callbacks.len(), "listing callbacks");
    Json(Envelope::ok_with(callbacks))
}

pub async fn get_callback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<CallbackRecord>>, ApiError> {
    state
        .store
        .find(&id)
        .await
        .map(|record| Json(Envelope::ok_with(record)))
        .ok_or(ApiError::NotFound)
}

pub async fn dashboard_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let callbacks = state.store.list().await;
    let html = dashboard::render(&callbacks, callbacks.len(), state.guard.is_enabled())?;
    Ok(Html(html))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Forwarded-for first, then X-Real-IP, then the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Form bodies become an object of string fields; anything else is read as
/// JSON. Empty or unparseable bodies are stored as `{}`.
fn parse_payload(headers: &HeaderMap, body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }

    let is_form = header_str(headers, CONTENT_TYPE.as_str())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        let fields = url::form_urlencoded::parse(body)
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect::<Map<String, Value>>();
        return Value::Object(fields);
    }

    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "callback body is not JSON, storing empty payload");
            Value::Object(Map::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_peer() {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("198.51.100.2"));

        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("127.0.0.1"));
        assert_eq!(client_ip(&headers, None), None);
    }

    #[test]
    fn parse_payload_reads_json() {
        let headers = HeaderMap::new();
        let payload = parse_payload(&headers, br#"{"code":200,"data":[1,2]}"#);
        assert_eq!(payload, json!({"code": 200, "data": [1, 2]}));
    }

    #[test]
    fn parse_payload_reads_form_bodies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        let payload = parse_payload(&headers, b"status=done&task_id=a%20b");
        assert_eq!(payload, json!({"status": "done", "task_id": "a b"}));
    }

    #[test]
    fn parse_payload_defaults_to_empty_object() {
        let headers = HeaderMap::new();
        assert_eq!(parse_payload(&headers, b""), json!({}));
        assert_eq!(parse_payload(&headers, b"  \n"), json!({}));
        assert_eq!(parse_payload(&headers, b"not json"), json!({}));
    }
}
