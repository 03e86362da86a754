//! Install/uninstall policy over a [`ServiceManager`]. Both operations are
//! best-effort and quiet: progress goes to `debug`, callers log failures and
//! carry on.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use beeper_platform::service::{ServiceIdentity, ServiceManager, ServiceState, StartPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Deleted,
    /// The registration was kept because the service was not stopped.
    LeftRunning(ServiceState),
}

/// Register `executable` as an automatically started service.
pub fn install(
    manager: &dyn ServiceManager,
    identity: &ServiceIdentity,
    executable: &Path,
) -> Result<()> {
    debug!("installing service {} ({})", identity, executable.display());
    manager
        .create_service(identity, executable, StartPolicy::Automatic)
        .with_context(|| format!("failed to create service {}", identity))?;
    debug!("service installed: {}", identity);
    Ok(())
}

/// Delete the registration, but only while the service is stopped.
///
/// The state check and the delete go through the same open handle.
pub fn uninstall(manager: &dyn ServiceManager, identity: &ServiceIdentity) -> Result<UninstallOutcome> {
    let record = manager
        .open_service(identity)
        .with_context(|| format!("failed to open service {}", identity))?;
    let state = record
        .query_state()
        .with_context(|| format!("failed to query service {}", identity))?;

    if state != ServiceState::Stopped {
        debug!("service {} is {}, leaving it installed", identity, state);
        return Ok(UninstallOutcome::LeftRunning(state));
    }

    record
        .delete()
        .with_context(|| format!("failed to delete service {}", identity))?;
    debug!("service uninstalled: {}", identity);
    Ok(UninstallOutcome::Deleted)
}
