use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::client::SnapshotService;
use super::domain::{ReadyPayload, SnapshotId, SnapshotStatus, ValidationError};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ConvertRequest {
    #[serde(default, rename = "linkedinUrl")]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckSnapshotQuery {
    #[serde(default, rename = "snapshotId")]
    pub snapshot_id: Option<String>,
}

/// Router exposing job submission and the status/download check.
pub fn snapshot_router<S>(service: Arc<S>) -> Router
where
    S: SnapshotService + 'static,
{
    Router::new()
        .route(
            "/api/convert",
            post(convert_handler::<S>).fallback(post_only),
        )
        .route(
            "/api/checkSnapshot",
            get(check_snapshot_handler::<S>).fallback(get_only),
        )
        .with_state(service)
}

pub(crate) async fn convert_handler<S>(
    State(service): State<Arc<S>>,
    payload: Option<Json<ConvertRequest>>,
) -> Result<Response, AppError>
where
    S: SnapshotService + 'static,
{
    let locator = payload
        .and_then(|Json(request)| request.linkedin_url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ValidationError::MissingLocator)?;

    let snapshot_id = service.trigger(&locator).await.map_err(|err| {
        error!(error = %err, "snapshot trigger failed");
        AppError::from(err)
    })?;
    info!(%snapshot_id, "conversion submitted");

    Ok((StatusCode::OK, Json(json!({ "snapshotId": snapshot_id }))).into_response())
}

pub(crate) async fn check_snapshot_handler<S>(
    State(service): State<Arc<S>>,
    Query(query): Query<CheckSnapshotQuery>,
) -> Result<Response, AppError>
where
    S: SnapshotService + 'static,
{
    let snapshot_id = query
        .snapshot_id
        .as_deref()
        .and_then(SnapshotId::parse)
        .ok_or(ValidationError::MissingSnapshotId)?;

    let status = service.status(&snapshot_id).await.map_err(|err| {
        error!(%snapshot_id, error = %err, "snapshot status check failed");
        AppError::from(err)
    })?;

    match status {
        SnapshotStatus::Running => {
            Ok((StatusCode::OK, Json(json!({ "status": "running" }))).into_response())
        }
        SnapshotStatus::Ready(record) => {
            let artifact = ReadyPayload::Record(record).into_artifact(Utc::now())?;
            info!(%snapshot_id, file = %artifact.file_name, "csv served");
            Ok(artifact.into_response())
        }
    }
}

async fn post_only(method: Method) -> Response {
    method_not_allowed(method, "POST")
}

async fn get_only(method: Method) -> Response {
    method_not_allowed(method, "GET")
}

fn method_not_allowed(method: Method, allowed: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allowed)],
        Json(json!({ "error": format!("Method {method} Not Allowed") })),
    )
        .into_response()
}
