use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use beeper_platform::service::ServiceState;

use crate::controller::LifecycleController;
use crate::signal::{StopSignal, WaitOutcome};

/// One unit of the service's actual work.
#[async_trait]
pub trait Workload: Send {
    async fn perform(&mut self) -> Result<()>;
}

/// Counts of what the worker did over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Units of work that completed
    pub performed: u64,
    /// Ticks where the service was not running
    pub skipped: u64,
    /// Units of work that returned an error
    pub failed: u64,
}

/// Run the worker loop until the stop signal is observed.
///
/// Work happens only while the controller reports Running. Between units the
/// loop waits on `signal` for `interval`, so a stop is noticed within one
/// interval. The signal is not touched after this returns.
pub async fn run(
    controller: &LifecycleController,
    signal: &StopSignal,
    interval: Duration,
    workload: &mut dyn Workload,
) -> WorkerReport {
    let mut report = WorkerReport::default();

    loop {
        let state = controller.current_state();
        if state == ServiceState::Running {
            match workload.perform().await {
                Ok(()) => report.performed += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!("work unit failed: {:#}", e);
                }
            }
        } else {
            report.skipped += 1;
            debug!("skipping work unit while {}", state);
        }

        match signal.wait_or_timeout(interval).await {
            WaitOutcome::Signaled => break,
            WaitOutcome::TimedOut => continue,
        }
    }

    info!(
        "worker exiting: {} performed, {} skipped, {} failed",
        report.performed, report.skipped, report.failed
    );
    report
}
