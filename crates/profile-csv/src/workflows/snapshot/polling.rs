use std::time::Duration;

use super::domain::{ReadyPayload, SnapshotId};
use crate::config::PollingConfig;

pub const SUBMITTING_MESSAGE: &str = "Triggering scraping...";
pub const SUBMITTED_MESSAGE: &str = "Profile found. We'll start preparing your CSV.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Error triggering scraping. Please try again.";
pub const READY_MESSAGE: &str = "Success! You can download the CSV now.";
pub const GAVE_UP_MESSAGE: &str =
    "Still not ready and our API reached the limit attempts. Sorry, we failed this time!";

const STANDARD_TIERS: &[(u32, &str)] = &[
    (
        0,
        "Building the CSV might take a minute. In the meantime, please note: this app only scrapes profile data that isn't behind login.",
    ),
    (
        1,
        "Parsing data to the CSV. Users choose which data goes public, which often includes the full profile.",
    ),
    (3, "We are almost there..."),
    (
        u32::MAX,
        "Finishing the CSV. This one took a bit longer than usual.",
    ),
];

/// Waiting messages keyed by attempt band. Each entry holds the highest attempt
/// count (inclusive) it covers; lookup walks the bands in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTiers {
    tiers: Vec<(u32, String)>,
}

impl MessageTiers {
    pub fn new<I, T>(tiers: I) -> Self
    where
        I: IntoIterator<Item = (u32, T)>,
        T: Into<String>,
    {
        let mut tiers: Vec<(u32, String)> = tiers
            .into_iter()
            .map(|(bound, text)| (bound, text.into()))
            .collect();
        tiers.sort_by_key(|(bound, _)| *bound);
        Self { tiers }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_TIERS.iter().copied())
    }

    /// Message for a check made after `attempt` pending answers; past the last band
    /// the last message repeats.
    pub fn for_attempt(&self, attempt: u32) -> &str {
        self.tiers
            .iter()
            .find(|(bound, _)| attempt <= *bound)
            .or_else(|| self.tiers.last())
            .map(|(_, text)| text.as_str())
            .unwrap_or_default()
    }
}

impl Default for MessageTiers {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Ready,
    Failed(String),
    GaveUp,
}

impl PollStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub job_id: SnapshotId,
    pub attempts: u32,
    pub status: PollStatus,
}

/// A status-check answer after transport-level classification.
#[derive(Debug, Clone)]
pub enum CheckResponse {
    Running,
    Ready(ReadyPayload),
    Error(String),
}

/// What the caller has to do after one observed check.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Show `message`, wait `delay`, check again.
    Retry { message: String, delay: Duration },
    /// Convert and deliver the payload; nothing is checked afterwards.
    Ready { payload: ReadyPayload },
    Failed { reason: String, message: String },
    GaveUp { message: String },
}

impl Transition {
    pub fn message(&self) -> &str {
        match self {
            Transition::Retry { message, .. }
            | Transition::Failed { message, .. }
            | Transition::GaveUp { message } => message.as_str(),
            Transition::Ready { .. } => READY_MESSAGE,
        }
    }
}

/// Bounded wait on one snapshot. Pure: scheduling and display belong to the caller.
#[derive(Debug, Clone)]
pub struct PollController {
    state: PollState,
    settings: PollingConfig,
    tiers: MessageTiers,
}

impl PollController {
    pub fn new(job_id: SnapshotId, settings: PollingConfig) -> Self {
        Self::with_tiers(job_id, settings, MessageTiers::standard())
    }

    pub fn with_tiers(job_id: SnapshotId, settings: PollingConfig, tiers: MessageTiers) -> Self {
        Self {
            state: PollState {
                job_id,
                attempts: 0,
                status: PollStatus::Pending,
            },
            settings,
            tiers,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn job_id(&self) -> &SnapshotId {
        &self.state.job_id
    }

    /// Applies one check result. Returns `None` once the poll has already finished.
    ///
    /// A pending answer picks its message from the attempt count before the
    /// increment; reaching `max_attempts` ends the poll instead of retrying.
    pub fn observe(&mut self, response: CheckResponse) -> Option<Transition> {
        if self.state.status.is_terminal() {
            return None;
        }

        let transition = match response {
            CheckResponse::Running => {
                let message = self.tiers.for_attempt(self.state.attempts).to_string();
                self.state.attempts = self.state.attempts.saturating_add(1);

                if self.state.attempts >= self.settings.max_attempts {
                    self.state.status = PollStatus::GaveUp;
                    Transition::GaveUp {
                        message: GAVE_UP_MESSAGE.to_string(),
                    }
                } else {
                    Transition::Retry {
                        message,
                        delay: self.settings.interval,
                    }
                }
            }
            CheckResponse::Ready(payload) => {
                self.state.status = PollStatus::Ready;
                Transition::Ready { payload }
            }
            CheckResponse::Error(reason) => {
                self.state.status = PollStatus::Failed(reason.clone());
                Transition::Failed {
                    message: failure_message(&reason),
                    reason,
                }
            }
        };

        Some(transition)
    }
}

pub(crate) fn failure_message(reason: &str) -> String {
    format!("Error polling snapshot: {reason}")
}

/// Why a conversion ended without a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollFailure {
    #[error("{0}")]
    Submit(String),
    #[error("snapshot failed: {0}")]
    Failed(String),
    #[error("{message} ({attempts} checks)", message = GAVE_UP_MESSAGE)]
    Exhausted { attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::profile::ProfileRecord;

    fn settings(max_attempts: u32) -> PollingConfig {
        PollingConfig {
            max_attempts,
            interval: Duration::from_secs(20),
        }
    }

    fn controller(max_attempts: u32) -> PollController {
        PollController::new(SnapshotId("abc123".to_string()), settings(max_attempts))
    }

    #[test]
    fn tiers_follow_attempt_bands() {
        let tiers = MessageTiers::standard();
        assert!(tiers.for_attempt(0).starts_with("Building the CSV"));
        assert!(tiers.for_attempt(1).starts_with("Parsing data"));
        assert_eq!(tiers.for_attempt(2), "We are almost there...");
        assert_eq!(tiers.for_attempt(3), "We are almost there...");
        assert!(tiers.for_attempt(4).starts_with("Finishing the CSV"));
        assert!(tiers.for_attempt(9).starts_with("Finishing the CSV"));
    }

    #[test]
    fn custom_tiers_are_sorted_and_repeat_last_band() {
        let tiers = MessageTiers::new(vec![(5, "later"), (0, "first")]);
        assert_eq!(tiers.for_attempt(0), "first");
        assert_eq!(tiers.for_attempt(3), "later");
        assert_eq!(tiers.for_attempt(50), "later");
        assert_eq!(MessageTiers::new(Vec::<(u32, String)>::new()).for_attempt(1), "");
    }

    #[test]
    fn pending_answers_below_the_cap_keep_polling() {
        let mut poll = controller(10);
        let expected = [
            MessageTiers::standard().for_attempt(0).to_string(),
            MessageTiers::standard().for_attempt(1).to_string(),
            "We are almost there...".to_string(),
        ];

        for (n, expected_message) in expected.iter().enumerate() {
            match poll.observe(CheckResponse::Running) {
                Some(Transition::Retry { message, delay }) => {
                    assert_eq!(&message, expected_message);
                    assert_eq!(delay, Duration::from_secs(20));
                }
                other => panic!("expected retry, got {other:?}"),
            }
            assert_eq!(poll.state().attempts, n as u32 + 1);
            assert_eq!(poll.state().status, PollStatus::Pending);
        }
    }

    #[test]
    fn exactly_max_pending_answers_give_up() {
        let mut poll = controller(10);
        for _ in 0..9 {
            assert!(matches!(
                poll.observe(CheckResponse::Running),
                Some(Transition::Retry { .. })
            ));
        }
        assert_eq!(poll.state().attempts, 9);

        match poll.observe(CheckResponse::Running) {
            Some(Transition::GaveUp { message }) => assert_eq!(message, GAVE_UP_MESSAGE),
            other => panic!("expected give up, got {other:?}"),
        }
        assert_eq!(poll.state().status, PollStatus::GaveUp);
        assert!(poll.observe(CheckResponse::Running).is_none());
    }

    #[test]
    fn ready_is_terminal_at_any_attempt() {
        for pending in 0..5 {
            let mut poll = controller(10);
            for _ in 0..pending {
                poll.observe(CheckResponse::Running);
            }
            let transition = poll
                .observe(CheckResponse::Ready(ReadyPayload::Record(Box::new(
                    ProfileRecord::default(),
                ))))
                .expect("transition");
            assert!(matches!(transition, Transition::Ready { .. }));
            assert_eq!(transition.message(), READY_MESSAGE);
            assert_eq!(poll.state().status, PollStatus::Ready);
            assert!(poll.observe(CheckResponse::Running).is_none());
        }
    }

    #[test]
    fn errors_fail_without_retry() {
        let mut poll = controller(10);
        poll.observe(CheckResponse::Running);
        match poll.observe(CheckResponse::Error("Unknown response type.".to_string())) {
            Some(Transition::Failed { reason, message }) => {
                assert_eq!(reason, "Unknown response type.");
                assert_eq!(message, "Error polling snapshot: Unknown response type.");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(
            poll.state().status,
            PollStatus::Failed("Unknown response type.".to_string())
        );
        assert_eq!(poll.state().attempts, 1);
        assert!(poll.observe(CheckResponse::Running).is_none());
    }

    #[test]
    fn zero_cap_gives_up_on_first_pending_answer() {
        let mut poll = controller(0);
        assert!(matches!(
            poll.observe(CheckResponse::Running),
            Some(Transition::GaveUp { .. })
        ));
    }
}
