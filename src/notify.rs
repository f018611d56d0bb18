//! Notifications
//!
//! Workflows report progress through a [`NotificationSink`] rather than
//! rendering anything themselves. A host UI shows toasts or spinners; the
//! bundled sinks log to the tracing subscriber or record signals for
//! inspection.

use std::sync::Mutex;

use jiff::Timestamp;
use mockall::automock;
use tracing::{error, info};

/// A single user-facing signal emitted by a workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A long-running step started; the message names it.
    Loading(String),

    /// The in-flight indicator was dismissed.
    LoadingCleared,

    /// A transaction entered the pending state.
    Pending(String),

    /// The workflow finished successfully.
    Success(String),

    /// The workflow failed with a user-facing message.
    Failure(String),
}

/// Receives progress and outcome signals from workflows.
///
/// Calls arrive in workflow order; sinks must tolerate `clear_loading`
/// without a preceding `loading`.
#[automock]
pub trait NotificationSink: Send + Sync {
    /// Show, or replace, the in-flight indicator with `message`.
    fn loading(&self, message: &str);

    /// Dismiss the in-flight indicator.
    fn clear_loading(&self);

    /// Announce a transaction awaiting confirmation.
    fn pending(&self, message: &str);

    /// Announce a successful outcome.
    fn success(&self, message: &str);

    /// Announce a failed outcome with a user-facing message.
    fn failure(&self, message: &str);
}

/// Sink that forwards every signal to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn loading(&self, message: &str) {
        info!(%message, "loading");
    }

    fn clear_loading(&self) {
        info!("loading cleared");
    }

    fn pending(&self, message: &str) {
        info!(%message, "transaction pending");
    }

    fn success(&self, message: &str) {
        info!(%message, "workflow succeeded");
    }

    fn failure(&self, message: &str) {
        error!(%message, "workflow failed");
    }
}

/// Sink that records every signal with its arrival time.
///
/// Tests and demos use this to assert on signal ordering and on indicator
/// cleanup.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<(Timestamp, Notification)>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals recorded so far, oldest first, with their arrival times.
    #[must_use]
    pub fn entries(&self) -> Vec<(Timestamp, Notification)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Signals recorded so far without their timestamps.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries()
            .into_iter()
            .map(|(_, notification)| notification)
            .collect()
    }

    fn record(&self, notification: Notification) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((Timestamp::now(), notification));
    }
}

impl NotificationSink for RecordingNotifier {
    fn loading(&self, message: &str) {
        self.record(Notification::Loading(message.to_owned()));
    }

    fn clear_loading(&self) {
        self.record(Notification::LoadingCleared);
    }

    fn pending(&self, message: &str) {
        self.record(Notification::Pending(message.to_owned()));
    }

    fn success(&self, message: &str) {
        self.record(Notification::Success(message.to_owned()));
    }

    fn failure(&self, message: &str) {
        self.record(Notification::Failure(message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_preserves_signal_order() {
        let recorder = RecordingNotifier::new();

        recorder.loading("Approving...");
        recorder.pending("Purchasing product...");
        recorder.success("Product purchased successfully");
        recorder.clear_loading();

        assert_eq!(
            recorder.notifications(),
            vec![
                Notification::Loading("Approving...".to_owned()),
                Notification::Pending("Purchasing product...".to_owned()),
                Notification::Success("Product purchased successfully".to_owned()),
                Notification::LoadingCleared,
            ]
        );
    }

    #[test]
    fn recorder_timestamps_never_run_backwards() {
        let recorder = RecordingNotifier::new();

        recorder.loading("first");
        recorder.failure("second");

        match recorder.entries().as_slice() {
            [(first, _), (second, _)] => assert!(first <= second),
            other => panic!("expected two entries, got {other:?}"),
        }
    }

    #[test]
    fn clear_without_loading_is_recorded() {
        let recorder = RecordingNotifier::new();

        recorder.clear_loading();

        assert_eq!(recorder.notifications(), vec![Notification::LoadingCleared]);
    }
}
