use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::domain::{classify_snapshot_payload, SnapshotId, SnapshotStatus, UpstreamError};
use crate::config::SnapshotServiceConfig;

/// The asynchronous scraping job service.
#[async_trait]
pub trait SnapshotService: Send + Sync {
    /// Starts a scrape of `locator` and returns its job id.
    async fn trigger(&self, locator: &str) -> Result<SnapshotId, UpstreamError>;

    /// Reports whether the job is still running or hands back the finished record.
    async fn status(&self, snapshot_id: &SnapshotId) -> Result<SnapshotStatus, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct TriggerInput<'a> {
    url: &'a str,
}

/// reqwest-backed client for the dataset trigger and snapshot endpoints.
#[derive(Debug, Clone)]
pub struct HttpSnapshotClient {
    http: reqwest::Client,
    config: SnapshotServiceConfig,
}

impl HttpSnapshotClient {
    pub fn new(config: SnapshotServiceConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn snapshot_url(&self, snapshot_id: &SnapshotId) -> Result<Url, UpstreamError> {
        let base = self.config.snapshot_url.trim_end_matches('/');
        let invalid = |reason: String| UpstreamError::InvalidEndpoint {
            url: base.to_string(),
            reason,
        };

        let mut url = Url::parse(base).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot carry path segments".to_string()))?
            .push(snapshot_id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl SnapshotService for HttpSnapshotClient {
    async fn trigger(&self, locator: &str) -> Result<SnapshotId, UpstreamError> {
        let trigger_url = self
            .config
            .trigger_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("BD_API_URL"))?;
        let dataset_id = self
            .config
            .dataset_id
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("DATASET_ID"))?;

        let request = self
            .http
            .post(trigger_url)
            .query(&[("dataset_id", dataset_id), ("include_errors", "true")])
            .json(&[TriggerInput { url: locator }]);
        let response = ensure_success(self.authorized(request).send().await?).await?;
        let payload: Value = response.json().await?;
        debug!(%payload, "trigger response");

        let snapshot_id = payload
            .get("snapshot_id")
            .and_then(Value::as_str)
            .and_then(SnapshotId::parse)
            .ok_or(UpstreamError::MissingSnapshotId)?;
        info!(%snapshot_id, "snapshot triggered");
        Ok(snapshot_id)
    }

    async fn status(&self, snapshot_id: &SnapshotId) -> Result<SnapshotStatus, UpstreamError> {
        let url = self.snapshot_url(snapshot_id)?;
        let response = ensure_success(self.authorized(self.http.get(url)).send().await?).await?;
        let payload: Value = response.json().await?;

        let status = classify_snapshot_payload(payload)?;
        debug!(
            %snapshot_id,
            running = matches!(status, SnapshotStatus::Running),
            "snapshot status checked"
        );
        Ok(status)
    }
}

async fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        status: status.as_u16(),
        body,
    })
}
