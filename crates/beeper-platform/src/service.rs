use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

/// Lifecycle state as understood by the OS service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Stopped,
    StartPending,
    Running,
    Paused,
    StopPending,
    /// Only ever reported by [`ServiceRecord::query_state`].
    ContinuePending,
    /// Only ever reported by [`ServiceRecord::query_state`].
    PausePending,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Stopped => "stopped",
            ServiceState::StartPending => "start-pending",
            ServiceState::Running => "running",
            ServiceState::Paused => "paused",
            ServiceState::StopPending => "stop-pending",
            ServiceState::ContinuePending => "continue-pending",
            ServiceState::PausePending => "pause-pending",
        };
        f.write_str(name)
    }
}

/// A request delivered by the service manager to the control callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    Stop,
    Pause,
    Continue,
    Shutdown,
    Interrogate,
    /// Vendor range 128..=255, free for the service to interpret.
    UserDefined(u8),
    /// Any other code the OS defines; the service never interprets these.
    Reserved,
}

impl ControlCode {
    /// Stop and Shutdown both end the run.
    pub fn is_stop_request(&self) -> bool {
        matches!(self, ControlCode::Stop | ControlCode::Shutdown)
    }
}

/// What the control callback tells the OS it did with a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlResponse {
    Handled,
    NotImplemented,
}

/// Set of control kinds the service currently honors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptedControls {
    pub pause_continue: bool,
    pub stop: bool,
    pub shutdown: bool,
}

impl AcceptedControls {
    pub fn pause_stop_shutdown() -> Self {
        Self {
            pause_continue: true,
            stop: true,
            shutdown: true,
        }
    }
}

/// The status record published to the service manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub current_state: ServiceState,
    pub accepted_controls: AcceptedControls,
    /// Win32 exit code
    pub exit_code: u32,
    pub checkpoint: u32,
    pub wait_hint: Duration,
}

impl ServiceStatus {
    /// The zeroed record a service starts from: stopped, no error, no progress hints.
    pub fn initial(accepted_controls: AcceptedControls) -> Self {
        Self {
            current_state: ServiceState::Stopped,
            accepted_controls,
            exit_code: 0,
            checkpoint: 0,
            wait_hint: Duration::ZERO,
        }
    }
}

/// Name the service is registered and looked up under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity(String);

impl ServiceIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPolicy {
    Automatic,
    OnDemand,
    Disabled,
}

/// Receives control requests from the service manager.
///
/// Called asynchronously, possibly from a dispatcher thread, so it must
/// never block.
pub trait ControlSink: Send + Sync {
    fn handle(&self, control: ControlCode) -> ControlResponse;
}

/// Publishes a status record to the service manager.
pub trait StatusReporter: Send + Sync {
    fn report(&self, status: &ServiceStatus) -> Result<()>;
}

/// Registers a control sink for a service and hands back its status channel.
pub trait ServiceHost {
    /// Fails when the process was not started by the service manager.
    fn register(
        &self,
        identity: &ServiceIdentity,
        sink: Arc<dyn ControlSink>,
    ) -> Result<Box<dyn StatusReporter>>;
}

/// An open handle on one service registration.
pub trait ServiceRecord {
    /// Current state of the service
    fn query_state(&self) -> Result<ServiceState>;

    /// Remove the registration
    fn delete(&self) -> Result<()>;
}

/// Registration records kept by the service manager.
pub trait ServiceManager {
    /// Create the registration for `executable` under `identity`
    fn create_service(
        &self,
        identity: &ServiceIdentity,
        executable: &Path,
        start: StartPolicy,
    ) -> Result<()>;

    /// Open the registration with rights to both query and delete it
    fn open_service(&self, identity: &ServiceIdentity) -> Result<Box<dyn ServiceRecord>>;
}
