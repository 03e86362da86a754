//! Binary auto-reset stop signal shared between the control callback and the worker.

use std::time::Duration;

use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signaled,
    TimedOut,
}

/// A single-slot "stop requested" flag.
///
/// Raising stores at most one pending wake-up; a wait that observes it
/// consumes it. Raising is synchronous and never blocks, so it is safe to
/// call from the control callback.
#[derive(Debug, Default)]
pub struct StopSignal {
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Raising again before it is consumed is a no-op.
    pub fn request_stop(&self) {
        self.notify.notify_one();
    }

    /// Wait for the signal for at most `timeout`.
    pub async fn wait_or_timeout(&self, timeout: Duration) -> WaitOutcome {
        match tokio::time::timeout(timeout, self.notify.notified()).await {
            Ok(()) => WaitOutcome::Signaled,
            Err(_) => WaitOutcome::TimedOut,
        }
    }
}
