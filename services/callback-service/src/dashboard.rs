use chrono::SecondsFormat;
use minijinja::{context, Environment};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::CallbackRecord;
use crate::probe::{CallbackSummary, MISSING};

/// Number of records shown on the dashboard.
pub const DASHBOARD_LIMIT: usize = 50;

const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE: &str = include_str!("../templates/dashboard.html");

#[derive(Debug, Serialize)]
struct DashboardRow {
    id: String,
    received_at: String,
    status: String,
    task_id: String,
    download_url: String,
    download_link: Option<String>,
    ip: String,
}

impl DashboardRow {
    fn from_record(record: &CallbackRecord) -> Self {
        let summary = CallbackSummary::probe(&record.payload);
        // Only plain web links become anchors.
        let download_link = Some(summary.download_url.clone())
            .filter(|url| url.starts_with("https://") || url.starts_with("http://"));
        Self {
            id: record.id.clone(),
            received_at: record
                .received_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            status: summary.status,
            task_id: summary.task_id,
            download_url: summary.download_url,
            download_link,
            ip: record.ip.clone().unwrap_or_else(|| MISSING.to_string()),
        }
    }
}

/// Renders the status page for `records`, which must already be newest first.
pub fn render(
    records: &[CallbackRecord],
    total: usize,
    auth_enabled: bool,
) -> Result<String, ApiError> {
    let rows: Vec<DashboardRow> = records
        .iter()
        .take(DASHBOARD_LIMIT)
        .map(DashboardRow::from_record)
        .collect();

    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)
        .map_err(|e| ApiError::Render(e.to_string()))?;
    let template = env
        .get_template(TEMPLATE_NAME)
        .map_err(|e| ApiError::Render(e.to_string()))?;

    template
        .render(context! {
            rows => rows,
            total => total,
            auth_enabled => auth_enabled,
        })
        .map_err(|e| ApiError::Render(e.to_string()))
}
