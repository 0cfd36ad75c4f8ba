use crate::infra::TerminalDisplay;
use clap::Args;
use profile_csv::config::{AppConfig, PollingConfig};
use profile_csv::error::AppError;
use profile_csv::telemetry;
use profile_csv::workflows::profile::flatten;
use profile_csv::workflows::snapshot::{
    classify_snapshot_payload, run_poll_loop, ApiClient, DirectorySink, HttpSnapshotClient,
    PollController, PollFailure, PollOutcome, ServiceProbe, SnapshotId, SnapshotService,
    SnapshotStatus, StatusDisplay, StatusProbe, TokioScheduler, UpstreamError,
    SUBMITTED_MESSAGE, SUBMITTING_MESSAGE, SUBMIT_FAILED_MESSAGE,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// Public profile URL to convert
    #[arg(long)]
    pub(crate) url: String,
    /// Base URL of a running service; the job service is called directly when omitted
    #[arg(long)]
    pub(crate) api: Option<String>,
    /// Directory the CSV is written to
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,
    /// Override POLL_MAX_ATTEMPTS
    #[arg(long)]
    pub(crate) max_attempts: Option<u32>,
    /// Override POLL_INTERVAL_SECS
    #[arg(long)]
    pub(crate) interval_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct FlattenArgs {
    /// Snapshot JSON file (a record object or an array of records)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) async fn run_convert(args: ConvertArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let polling = polling_settings(config.polling, args.max_attempts, args.interval_secs);
    let display = TerminalDisplay;
    let sink = DirectorySink::new(&args.out_dir);

    let outcome = match args.api.as_deref() {
        Some(base_url) => {
            let client = ApiClient::new(base_url, config.snapshot.request_timeout)?;
            let submitted = client.submit(&args.url).await;
            submit_and_poll(submitted, &client, polling, &display, &sink).await?
        }
        None => {
            let service = Arc::new(HttpSnapshotClient::new(config.snapshot.clone())?);
            let submitted = service.trigger(&args.url).await;
            let probe = ServiceProbe::new(service);
            submit_and_poll(submitted, &probe, polling, &display, &sink).await?
        }
    };

    let path = finish(outcome, &sink)?;
    println!("{}", path.display());
    Ok(())
}

fn polling_settings(
    base: PollingConfig,
    max_attempts: Option<u32>,
    interval_secs: Option<u64>,
) -> PollingConfig {
    PollingConfig {
        max_attempts: max_attempts.unwrap_or(base.max_attempts),
        interval: interval_secs
            .map(Duration::from_secs)
            .unwrap_or(base.interval),
    }
}

async fn submit_and_poll<P>(
    submitted: Result<SnapshotId, UpstreamError>,
    probe: &P,
    polling: PollingConfig,
    display: &dyn StatusDisplay,
    sink: &DirectorySink,
) -> Result<PollOutcome, AppError>
where
    P: StatusProbe,
{
    display.show(SUBMITTING_MESSAGE);
    let snapshot_id = match submitted {
        Ok(snapshot_id) => snapshot_id,
        Err(err) => {
            warn!(error = %err, "conversion submit failed");
            display.show(SUBMIT_FAILED_MESSAGE);
            return Err(PollFailure::Submit(err.to_string()).into());
        }
    };

    info!(%snapshot_id, max_attempts = polling.max_attempts, "polling snapshot");
    display.show(SUBMITTED_MESSAGE);

    let controller = PollController::new(snapshot_id, polling);
    Ok(run_poll_loop(controller, probe, &TokioScheduler, display, sink).await)
}

fn finish(outcome: PollOutcome, sink: &DirectorySink) -> Result<PathBuf, AppError> {
    match outcome {
        PollOutcome::Delivered { artifact, .. } => Ok(sink.path_for(&artifact)),
        PollOutcome::Failed { reason } => Err(PollFailure::Failed(reason).into()),
        PollOutcome::GaveUp { attempts } => Err(PollFailure::Exhausted { attempts }.into()),
    }
}

pub(crate) fn run_flatten(args: FlattenArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.input)?;
    let csv = flatten_snapshot(&raw)?;

    match args.output {
        Some(path) => fs::write(path, csv)?,
        None => println!("{csv}"),
    }
    Ok(())
}

fn flatten_snapshot(raw: &str) -> Result<String, AppError> {
    let payload: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| UpstreamError::Malformed(err.to_string()))?;

    match classify_snapshot_payload(payload)? {
        SnapshotStatus::Ready(record) => Ok(flatten(&record).to_csv()?),
        SnapshotStatus::Running => {
            Err(PollFailure::Failed("snapshot is still running".to_string()).into())
        }
    }
}
