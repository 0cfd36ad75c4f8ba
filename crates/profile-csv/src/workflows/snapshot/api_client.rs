use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::domain::{ReadyPayload, SnapshotId, UpstreamError};
use super::polling::CheckResponse;
use super::runner::StatusProbe;

const CHECK_FAILED: &str = "Check snapshot failed";
const UNEXPECTED_JSON: &str = "Unexpected JSON response.";
const UNKNOWN_TYPE: &str = "Unknown response type.";

#[derive(Debug, Serialize)]
struct ConvertBody<'a> {
    #[serde(rename = "linkedinUrl")]
    linkedin_url: &'a str,
}

/// Client for the `/api/convert` and `/api/checkSnapshot` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submits a profile URL and returns the job id to poll.
    pub async fn submit(&self, locator: &str) -> Result<SnapshotId, UpstreamError> {
        let response = self
            .http
            .post(self.endpoint("/api/convert"))
            .json(&ConvertBody {
                linkedin_url: locator,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        payload
            .get("snapshotId")
            .and_then(Value::as_str)
            .and_then(SnapshotId::parse)
            .ok_or(UpstreamError::MissingSnapshotId)
    }
}

#[async_trait]
impl StatusProbe for ApiClient {
    async fn check(&self, snapshot_id: &SnapshotId) -> CheckResponse {
        let sent = self
            .http
            .get(self.endpoint("/api/checkSnapshot"))
            .query(&[("snapshotId", snapshot_id.as_str())])
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                warn!(%snapshot_id, error = %err, "check request failed");
                return CheckResponse::Error(err.to_string());
            }
        };

        if !response.status().is_success() {
            warn!(%snapshot_id, status = %response.status(), "check returned an error status");
            return CheckResponse::Error(CHECK_FAILED.to_string());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match response.text().await {
            Ok(body) => classify_check_response(content_type.as_deref(), body),
            Err(err) => CheckResponse::Error(err.to_string()),
        }
    }
}

/// Classifies a successful check response by its content type: JSON is either the
/// running marker or unexpected, `text/csv` is the finished file.
pub fn classify_check_response(content_type: Option<&str>, body: String) -> CheckResponse {
    let essence = content_type
        .and_then(|raw| raw.parse::<mime::Mime>().ok())
        .map(|parsed| parsed.essence_str().to_ascii_lowercase());

    match essence.as_deref() {
        Some("application/json") => {
            let running = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|payload| {
                    payload
                        .get("status")
                        .and_then(Value::as_str)
                        .map(|status| status == "running")
                })
                .unwrap_or(false);
            debug!(running, "json check response");
            if running {
                CheckResponse::Running
            } else {
                CheckResponse::Error(UNEXPECTED_JSON.to_string())
            }
        }
        Some("text/csv") => CheckResponse::Ready(ReadyPayload::Csv(body)),
        _ => CheckResponse::Error(UNKNOWN_TYPE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_text(response: CheckResponse) -> String {
        match response {
            CheckResponse::Error(reason) => reason,
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn running_json_keeps_polling() {
        let response = classify_check_response(
            Some("application/json; charset=utf-8"),
            r#"{"status":"running"}"#.to_string(),
        );
        assert!(matches!(response, CheckResponse::Running));
    }

    #[test]
    fn other_json_is_unexpected() {
        let response =
            classify_check_response(Some("application/json"), r#"{"status":"done"}"#.to_string());
        assert_eq!(error_text(response), UNEXPECTED_JSON);

        let response = classify_check_response(Some("application/json"), "not json".to_string());
        assert_eq!(error_text(response), UNEXPECTED_JSON);
    }

    #[test]
    fn csv_body_is_ready() {
        match classify_check_response(Some("text/csv"), "id\n\"1\"".to_string()) {
            CheckResponse::Ready(ReadyPayload::Csv(body)) => assert_eq!(body, "id\n\"1\""),
            other => panic!("expected csv, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_foreign_types_are_unknown() {
        assert_eq!(
            error_text(classify_check_response(None, String::new())),
            UNKNOWN_TYPE
        );
        assert_eq!(
            error_text(classify_check_response(Some("text/html"), "<p>".to_string())),
            UNKNOWN_TYPE
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:3000/", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(client.base_url(), "http://127.0.0.1:3000");
        assert_eq!(
            client.endpoint("/api/convert"),
            "http://127.0.0.1:3000/api/convert"
        );
    }
}
