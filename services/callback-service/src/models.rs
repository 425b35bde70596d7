use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound callback as it is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRecord {
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub payload: Value,
}

impl CallbackRecord {
    pub fn new(ip: Option<String>, user_agent: Option<String>, payload: Value) -> Self {
        let received_at = Utc::now().trunc_subsecs(3);
        Self {
            id: generate_id(received_at),
            received_at,
            ip,
            user_agent,
            payload,
        }
    }
}

/// `{epoch-millis}_{six hex digits}`. Uniqueness is probabilistic only.
pub fn generate_id(at: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x100_0000);
    format!("{}_{:06x}", at.timestamp_millis(), suffix)
}

/// The whole on-disk document, newest record first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub callbacks: Vec<CallbackRecord>,
}

/// Uniform `{code, msg, data?}` response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Envelope<Value> {
    pub fn ok() -> Self {
        Self::message(200, "ok")
    }

    pub fn message(code: u16, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn ok_with(data: T) -> Self {
        Self {
            code: 200,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = CallbackRecord::new(None, Some("curl/8.0".into()), json!({"a": 1}));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], json!(record.id));
        assert_eq!(value["userAgent"], json!("curl/8.0"));
        assert_eq!(value["ip"], Value::Null);
        assert!(value["receivedAt"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["payload"], json!({"a": 1}));
    }

    #[test]
    fn id_has_millis_prefix_and_hex_suffix() {
        let at = Utc::now();
        let id = generate_id(at);
        let (millis, suffix) = id.split_once('_').unwrap();

        assert_eq!(millis, at.timestamp_millis().to_string());
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn envelope_omits_missing_data() {
        let body = serde_json::to_value(Envelope::ok()).unwrap();
        assert_eq!(body, json!({"code": 200, "msg": "ok"}));

        let body = serde_json::to_value(Envelope::ok_with(vec![1, 2])).unwrap();
        assert_eq!(body, json!({"code": 200, "msg": "ok", "data": [1, 2]}));
    }

    #[test]
    fn document_without_callbacks_key_reads_as_empty() {
        let doc: StoreDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.callbacks.is_empty());
    }
}
