//! Submitting scrape jobs, checking on them, and turning finished snapshots into
//! CSV downloads.

mod api_client;
mod client;
mod domain;
mod polling;
mod router;
mod runner;

pub use api_client::{classify_check_response, ApiClient};
pub use client::{HttpSnapshotClient, SnapshotService};
pub use domain::{
    classify_snapshot_payload, CsvArtifact, ReadyPayload, SnapshotError, SnapshotId,
    SnapshotStatus, UpstreamError, ValidationError,
};
pub use polling::{
    CheckResponse, MessageTiers, PollController, PollFailure, PollState, PollStatus, Transition,
    GAVE_UP_MESSAGE, READY_MESSAGE, SUBMITTED_MESSAGE, SUBMITTING_MESSAGE, SUBMIT_FAILED_MESSAGE,
};
pub use router::{snapshot_router, CheckSnapshotQuery, ConvertRequest};
pub use runner::{
    run_poll_loop, DirectorySink, PollOutcome, ResultSink, Scheduler, ServiceProbe,
    StatusDisplay, StatusProbe, TokioScheduler,
};
