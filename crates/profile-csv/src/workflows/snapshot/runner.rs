use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::client::SnapshotService;
use super::domain::{CsvArtifact, ReadyPayload, SnapshotId, SnapshotStatus};
use super::polling::{failure_message, CheckResponse, PollController, Transition, READY_MESSAGE};

/// One status check, already classified into pending / ready / error.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn check(&self, snapshot_id: &SnapshotId) -> CheckResponse;
}

/// Suspends the loop between checks.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn wait(&self, delay: Duration);
}

/// The single line of user-facing status text.
pub trait StatusDisplay: Send + Sync {
    fn show(&self, text: &str);
}

/// Receives the finished CSV file.
pub trait ResultSink: Send + Sync {
    fn deliver(&self, artifact: &CsvArtifact) -> std::io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Writes each artifact under its own file name into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, artifact: &CsvArtifact) -> PathBuf {
        self.directory.join(&artifact.file_name)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ResultSink for DirectorySink {
    fn deliver(&self, artifact: &CsvArtifact) -> std::io::Result<()> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.path_for(artifact), artifact.body.as_bytes())
    }
}

/// Checks the job service directly, bypassing the HTTP boundary.
pub struct ServiceProbe<S> {
    service: Arc<S>,
}

impl<S> ServiceProbe<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> StatusProbe for ServiceProbe<S>
where
    S: SnapshotService + 'static,
{
    async fn check(&self, snapshot_id: &SnapshotId) -> CheckResponse {
        match self.service.status(snapshot_id).await {
            Ok(SnapshotStatus::Running) => CheckResponse::Running,
            Ok(SnapshotStatus::Ready(record)) => CheckResponse::Ready(ReadyPayload::Record(record)),
            Err(err) => CheckResponse::Error(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Delivered { artifact: CsvArtifact, attempts: u32 },
    Failed { reason: String },
    GaveUp { attempts: u32 },
}

/// Drives `controller` to a terminal state: one outstanding check at a time, a
/// constant wait between checks, one status line per transition and at most one
/// delivery.
pub async fn run_poll_loop<P, S>(
    mut controller: PollController,
    probe: &P,
    scheduler: &S,
    display: &dyn StatusDisplay,
    sink: &dyn ResultSink,
) -> PollOutcome
where
    P: StatusProbe + ?Sized,
    S: Scheduler + ?Sized,
{
    let snapshot_id = controller.job_id().clone();

    loop {
        let response = probe.check(&snapshot_id).await;
        let Some(transition) = controller.observe(response) else {
            return PollOutcome::Failed {
                reason: "poll already finished".to_string(),
            };
        };
        let attempts = controller.state().attempts;

        match transition {
            Transition::Retry { message, delay } => {
                debug!(%snapshot_id, attempts, "snapshot still running");
                display.show(&message);
                scheduler.wait(delay).await;
            }
            Transition::Ready { payload } => {
                return deliver(&snapshot_id, payload, attempts, display, sink);
            }
            Transition::Failed { reason, message } => {
                warn!(%snapshot_id, %reason, "snapshot poll failed");
                display.show(&message);
                return PollOutcome::Failed { reason };
            }
            Transition::GaveUp { message } => {
                warn!(%snapshot_id, attempts, "snapshot poll exhausted");
                display.show(&message);
                return PollOutcome::GaveUp { attempts };
            }
        }
    }
}

fn deliver(
    snapshot_id: &SnapshotId,
    payload: ReadyPayload,
    attempts: u32,
    display: &dyn StatusDisplay,
    sink: &dyn ResultSink,
) -> PollOutcome {
    let delivered = payload
        .into_artifact(Utc::now())
        .map_err(|err| format!("failed to encode CSV: {err}"))
        .and_then(|artifact| {
            sink.deliver(&artifact)
                .map(|_| artifact)
                .map_err(|err| format!("failed to save CSV: {err}"))
        });

    match delivered {
        Ok(artifact) => {
            info!(%snapshot_id, file = %artifact.file_name, attempts, "csv delivered");
            display.show(READY_MESSAGE);
            PollOutcome::Delivered { artifact, attempts }
        }
        Err(reason) => {
            warn!(%snapshot_id, %reason, "csv delivery failed");
            display.show(&failure_message(&reason));
            PollOutcome::Failed { reason }
        }
    }
}
