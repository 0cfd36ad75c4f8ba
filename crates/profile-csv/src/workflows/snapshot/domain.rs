use std::fmt;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflows::profile::{flatten, ProfileRecord};

/// Opaque job identifier issued by the scraping service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    /// Trims `raw`; blank input is not an id.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job service answer to a status check.
#[derive(Debug, Clone)]
pub enum SnapshotStatus {
    Running,
    Ready(Box<ProfileRecord>),
}

/// Interprets a snapshot payload: `{"status": "running"}` is pending, any other object
/// is the finished record, and an array carries the record as its first object.
pub fn classify_snapshot_payload(payload: Value) -> Result<SnapshotStatus, UpstreamError> {
    let record = match payload {
        Value::Object(ref fields) => {
            if fields.get("status").and_then(Value::as_str) == Some("running") {
                return Ok(SnapshotStatus::Running);
            }
            payload
        }
        Value::Array(items) => items
            .into_iter()
            .find(Value::is_object)
            .ok_or_else(|| UpstreamError::Malformed("snapshot contains no records".to_string()))?,
        other => {
            return Err(UpstreamError::Malformed(format!(
                "expected an object or array, got {other}"
            )))
        }
    };

    serde_json::from_value::<ProfileRecord>(record)
        .map(|record| SnapshotStatus::Ready(Box::new(record)))
        .map_err(|err| UpstreamError::Malformed(err.to_string()))
}

/// Data available once the snapshot is done: the raw record, or CSV text already
/// rendered by the HTTP boundary.
#[derive(Debug, Clone)]
pub enum ReadyPayload {
    Record(Box<ProfileRecord>),
    Csv(String),
}

impl ReadyPayload {
    pub fn into_artifact(self, produced_at: DateTime<Utc>) -> Result<CsvArtifact, csv::Error> {
        let body = match self {
            ReadyPayload::Record(record) => flatten(&record).to_csv()?,
            ReadyPayload::Csv(body) => body,
        };
        Ok(CsvArtifact::stamped(body, produced_at))
    }
}

/// The downloadable CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvArtifact {
    pub file_name: String,
    pub body: String,
}

impl CsvArtifact {
    pub fn stamped(body: String, produced_at: DateTime<Utc>) -> Self {
        Self {
            file_name: format!("profile_{}.csv", produced_at.timestamp_millis()),
            body,
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

impl IntoResponse for CsvArtifact {
    fn into_response(self) -> Response {
        let disposition = self.content_disposition();
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Missing caller input; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing linkedinUrl in request body")]
    MissingLocator,
    #[error("Missing snapshotId in query params")]
    MissingSnapshotId,
}

/// Failure talking to, or understanding, the scraping job service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("invalid job service endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("job service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("job service responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("No snapshot_id returned from the trigger request.")]
    MissingSnapshotId,
    #[error("unrecognized snapshot payload: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("failed to encode CSV: {0}")]
    Encode(#[from] csv::Error),
}
