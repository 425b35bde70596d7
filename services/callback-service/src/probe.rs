//! Field extraction from loosely-shaped callback payloads.
//!
//! The upstream service has shipped several payload layouts, so each field is
//! an ordered list of JSON pointers and the first one that resolves wins.

use serde_json::Value;

pub const STATUS_PATHS: &[&str] = &[
    "/data/callbackType",
    "/data/status",
    "/status",
    "/data/data/0/status",
    "/callbackType",
];

pub const TASK_ID_PATHS: &[&str] = &[
    "/data/task_id",
    "/data/taskId",
    "/task_id",
    "/taskId",
    "/data/data/0/task_id",
    "/data/data/0/id",
];

pub const DOWNLOAD_URL_PATHS: &[&str] = &[
    "/data/data/0/audio_url",
    "/data/data/0/audioUrl",
    "/data/data/0/stream_audio_url",
    "/data/audio_url",
    "/audio_url",
    "/audioUrl",
    "/data/url",
    "/url",
];

pub const UNKNOWN_STATUS: &str = "unknown";
pub const MISSING: &str = "-";

/// Returns the first non-empty string or number found at `paths`.
pub fn first_present(payload: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| payload.pointer(path))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallbackSummary {
    pub status: String,
    pub task_id: String,
    pub download_url: String,
}

impl CallbackSummary {
    pub fn probe(payload: &Value) -> Self {
        Self {
            status: first_present(payload, STATUS_PATHS)
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
            task_id: first_present(payload, TASK_ID_PATHS).unwrap_or_else(|| MISSING.to_string()),
            download_url: first_present(payload, DOWNLOAD_URL_PATHS)
                .unwrap_or_else(|| MISSING.to_string()),
        }
    }

    pub fn has_download(&self) -> bool {
        self.download_url != MISSING
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_generation_payload() {
        let payload = json!({
            "code": 200,
            "data": {
                "callbackType": "complete",
                "task_id": "task-123",
                "data": [{ "id": "clip-1", "audio_url": "https://cdn.example/a.mp3" }]
            }
        });

        let summary = CallbackSummary::probe(&payload);
        assert_eq!(summary.status, "complete");
        assert_eq!(summary.task_id, "task-123");
        assert_eq!(summary.download_url, "https://cdn.example/a.mp3");
        assert!(summary.has_download());
    }

    #[test]
    fn flat_payload_uses_lower_priority_paths() {
        let payload = json!({ "status": "SUCCESS", "taskId": 42, "url": "https://x/y" });

        let summary = CallbackSummary::probe(&payload);
        assert_eq!(summary.status, "SUCCESS");
        assert_eq!(summary.task_id, "42");
        assert_eq!(summary.download_url, "https://x/y");
    }

    #[test]
    fn earlier_path_wins_over_later() {
        let payload = json!({ "status": "outer", "data": { "status": "inner" } });
        assert_eq!(first_present(&payload, STATUS_PATHS).as_deref(), Some("inner"));
    }

    #[test]
    fn empty_strings_and_non_scalars_are_skipped() {
        let payload = json!({ "data": { "status": "" }, "status": { "nested": true }, "callbackType": "first" });
        assert_eq!(first_present(&payload, STATUS_PATHS).as_deref(), Some("first"));
    }

    #[test]
    fn missing_fields_fall_back_to_sentinels() {
        let summary = CallbackSummary::probe(&json!("not an object"));
        assert_eq!(summary.status, UNKNOWN_STATUS);
        assert_eq!(summary.task_id, MISSING);
        assert_eq!(summary.download_url, MISSING);
        assert!(!summary.has_download());
    }
}
