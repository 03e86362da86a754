//! Control handler registration and status reporting through the SCM.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use windows_service::service::{
    ServiceControl, ServiceControlAccept, ServiceExitCode, ServiceState as ScmState,
    ServiceStatus as ScmStatus, ServiceType,
};
use windows_service::service_control_handler::{self, ServiceControlHandlerResult, ServiceStatusHandle};

use beeper_platform::service::{
    AcceptedControls, ControlCode, ControlResponse, ControlSink, ServiceHost,
    ServiceIdentity, ServiceState, ServiceStatus, StatusReporter,
};

/// Registers with the SCM of the current process.
pub struct ScmHost;

impl ServiceHost for ScmHost {
    fn register(
        &self,
        identity: &ServiceIdentity,
        sink: Arc<dyn ControlSink>,
    ) -> Result<Box<dyn StatusReporter>> {
        let handle = service_control_handler::register(identity.name(), move |control| {
            match sink.handle(control_code(&control)) {
                ControlResponse::Handled => ServiceControlHandlerResult::NoError,
                ControlResponse::NotImplemented => ServiceControlHandlerResult::NotImplemented,
            }
        })
        .with_context(|| format!("RegisterServiceCtrlHandlerEx failed for {}", identity))?;

        Ok(Box::new(ScmReporter {
            handle: Mutex::new(handle),
        }))
    }
}

/// Status channel returned by registration
pub struct ScmReporter {
    handle: Mutex<ServiceStatusHandle>,
}

impl StatusReporter for ScmReporter {
    fn report(&self, status: &ServiceStatus) -> Result<()> {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        handle
            .set_service_status(scm_status(status))
            .context("SetServiceStatus failed")
    }
}

pub(crate) fn control_code(control: &ServiceControl) -> ControlCode {
    match control {
        ServiceControl::Stop => ControlCode::Stop,
        ServiceControl::Pause => ControlCode::Pause,
        ServiceControl::Continue => ControlCode::Continue,
        ServiceControl::Shutdown => ControlCode::Shutdown,
        ServiceControl::Interrogate => ControlCode::Interrogate,
        ServiceControl::UserEvent(code) => match u8::try_from(code.to_raw()) {
            Ok(raw) => ControlCode::UserDefined(raw),
            Err(_) => ControlCode::Reserved,
        },
        _ => ControlCode::Reserved,
    }
}

pub(crate) fn scm_state(state: ServiceState) -> ScmState {
    match state {
        ServiceState::Stopped => ScmState::Stopped,
        ServiceState::StartPending => ScmState::StartPending,
        ServiceState::Running => ScmState::Running,
        ServiceState::Paused => ScmState::Paused,
        ServiceState::StopPending => ScmState::StopPending,
        ServiceState::ContinuePending => ScmState::ContinuePending,
        ServiceState::PausePending => ScmState::PausePending,
    }
}

pub(crate) fn service_state(state: ScmState) -> ServiceState {
    match state {
        ScmState::Stopped => ServiceState::Stopped,
        ScmState::StartPending => ServiceState::StartPending,
        ScmState::Running => ServiceState::Running,
        ScmState::Paused => ServiceState::Paused,
        ScmState::StopPending => ServiceState::StopPending,
        ScmState::ContinuePending => ServiceState::ContinuePending,
        ScmState::PausePending => ServiceState::PausePending,
    }
}

fn scm_controls(accepted: AcceptedControls) -> ServiceControlAccept {
    let mut controls = ServiceControlAccept::empty();
    if accepted.pause_continue {
        controls |= ServiceControlAccept::PAUSE_CONTINUE;
    }
    if accepted.stop {
        controls |= ServiceControlAccept::STOP;
    }
    if accepted.shutdown {
        controls |= ServiceControlAccept::SHUTDOWN;
    }
    controls
}

pub(crate) fn scm_status(status: &ServiceStatus) -> ScmStatus {
    ScmStatus {
        service_type: ServiceType::OWN_PROCESS,
        current_state: scm_state(status.current_state),
        controls_accepted: scm_controls(status.accepted_controls),
        exit_code: ServiceExitCode::Win32(status.exit_code),
        checkpoint: status.checkpoint,
        wait_hint: status.wait_hint,
        process_id: None,
    }
}
