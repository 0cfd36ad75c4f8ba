use metrics_exporter_prometheus::PrometheusHandle;
use profile_csv::workflows::snapshot::StatusDisplay;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Prints each status line of a conversion to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TerminalDisplay;

impl StatusDisplay for TerminalDisplay {
    fn show(&self, text: &str) {
        debug!(status = text, "conversion status");
        println!("{text}");
    }
}
