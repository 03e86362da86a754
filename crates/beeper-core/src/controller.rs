//! Service lifecycle controller.
//!
//! Owns the canonical [`ServiceStatus`] and is its only writer. Every state
//! change is published to the service manager before the call that caused
//! it returns. Stop and Shutdown publish StopPending first and only then
//! raise the [`StopSignal`], so the manager hears "stopping" right away even
//! though the worker may need up to one interval to notice.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, info, warn};

use beeper_platform::service::{
    AcceptedControls, ControlCode, ControlResponse, ControlSink, ServiceIdentity, ServiceState,
    ServiceStatus, StatusReporter,
};

use crate::signal::StopSignal;

/// State that a control code moves the service to from `current`.
pub fn next_state(current: ServiceState, control: ControlCode) -> ServiceState {
    match (current, control) {
        (ServiceState::Running, ControlCode::Pause) => ServiceState::Paused,
        (ServiceState::Paused, ControlCode::Continue) => ServiceState::Running,
        (
            ServiceState::StartPending
            | ServiceState::Running
            | ServiceState::Paused
            | ServiceState::StopPending,
            ControlCode::Stop | ControlCode::Shutdown,
        ) => ServiceState::StopPending,
        (state, _) => state,
    }
}

pub struct LifecycleController {
    identity: ServiceIdentity,
    status: Mutex<ServiceStatus>,
    reporter: OnceLock<Box<dyn StatusReporter>>,
    stop_signal: Mutex<Option<Arc<StopSignal>>>,
}

impl LifecycleController {
    pub fn new(identity: ServiceIdentity) -> Self {
        Self {
            identity,
            status: Mutex::new(ServiceStatus::initial(
                AcceptedControls::pause_stop_shutdown(),
            )),
            reporter: OnceLock::new(),
            stop_signal: Mutex::new(None),
        }
    }

    /// Attach the status channel obtained from registration. Nothing is
    /// published before this.
    pub fn attach(&self, reporter: Box<dyn StatusReporter>) {
        if self.reporter.set(reporter).is_err() {
            warn!("service {}: status reporter already attached", self.identity);
        }
    }

    pub fn status(&self) -> ServiceStatus {
        self.lock_status().clone()
    }

    pub fn current_state(&self) -> ServiceState {
        self.lock_status().current_state
    }

    /// Allocate the stop signal and publish StartPending.
    ///
    /// The signal exists before the manager is told we are starting, so a
    /// stop that arrives during start-up is never lost.
    pub fn begin_start(&self) -> Arc<StopSignal> {
        let signal = Arc::new(StopSignal::new());
        *self.lock_signal() = Some(signal.clone());

        let mut status = self.lock_status();
        status.current_state = ServiceState::StartPending;
        self.publish(&status);
        info!("service {} starting", self.identity);
        signal
    }

    /// StartPending -> Running. Leaves any other state alone, in particular a
    /// StopPending reached by a stop during start-up.
    pub fn mark_running(&self) -> ServiceState {
        let mut status = self.lock_status();
        if status.current_state == ServiceState::StartPending {
            status.current_state = ServiceState::Running;
            self.publish(&status);
            info!("service {} running", self.identity);
        } else {
            debug!(
                "service {}: not entering running from {}",
                self.identity, status.current_state
            );
        }
        status.current_state
    }

    /// Called once the worker has exited: make sure StopPending went out,
    /// release the stop signal, then publish the final Stopped.
    pub fn finish(&self) {
        let mut status = self.lock_status();
        if status.current_state != ServiceState::StopPending {
            status.current_state = ServiceState::StopPending;
            self.publish(&status);
        }

        drop(self.lock_signal().take());

        status.current_state = ServiceState::Stopped;
        self.publish(&status);
        info!("service {} stopped", self.identity);
    }

    fn raise_stop(&self) {
        match self.lock_signal().as_ref() {
            Some(signal) => signal.request_stop(),
            None => debug!("service {}: no stop signal to raise", self.identity),
        }
    }

    fn publish(&self, status: &ServiceStatus) {
        let Some(reporter) = self.reporter.get() else {
            debug!(
                "service {}: no reporter attached, {} not published",
                self.identity, status.current_state
            );
            return;
        };
        if let Err(e) = reporter.report(status) {
            warn!(
                "service {}: failed to publish {}: {:#}",
                self.identity, status.current_state, e
            );
        }
    }

    fn lock_status(&self) -> MutexGuard<'_, ServiceStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_signal(&self) -> MutexGuard<'_, Option<Arc<StopSignal>>> {
        self.stop_signal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ControlSink for LifecycleController {
    fn handle(&self, control: ControlCode) -> ControlResponse {
        let stopping = {
            let mut status = self.lock_status();
            let previous = status.current_state;
            status.current_state = next_state(previous, control);
            if previous != status.current_state {
                info!(
                    "service {}: {:?} moved {} -> {}",
                    self.identity, control, previous, status.current_state
                );
            } else {
                debug!("service {}: {:?} in {}", self.identity, control, previous);
            }
            self.publish(&status);
            control.is_stop_request() && status.current_state == ServiceState::StopPending
        };

        if stopping {
            self.raise_stop();
        }

        match control {
            ControlCode::Reserved => ControlResponse::NotImplemented,
            _ => ControlResponse::Handled,
        }
    }
}
