//! Install/uninstall entry points. Failures are reported to the caller,
//! which logs them quietly; nothing here changes the exit code.

use anyhow::Result;

use beeper_core::config::ServiceConfig;

#[cfg(target_os = "windows")]
pub fn run_install(config: &ServiceConfig) -> Result<()> {
    use anyhow::Context;
    use beeper_core::installer;
    use beeper_windows::manager::WindowsServiceManager;

    let exe = std::env::current_exe().context("failed to get current exe path")?;
    installer::install(&WindowsServiceManager, &config.identity(), &exe)
}

#[cfg(target_os = "windows")]
pub fn run_uninstall(config: &ServiceConfig) -> Result<()> {
    use beeper_core::installer::{self, UninstallOutcome};
    use beeper_windows::manager::WindowsServiceManager;
    use tracing::debug;

    match installer::uninstall(&WindowsServiceManager, &config.identity())? {
        UninstallOutcome::Deleted => {}
        UninstallOutcome::LeftRunning(state) => {
            debug!("stop the service before uninstalling (currently {})", state);
        }
    }
    Ok(())
}

/// Host the service; returns once the SCM has stopped it.
#[cfg(target_os = "windows")]
pub fn run_service(config: ServiceConfig) -> Result<()> {
    beeper_windows::dispatcher::run_dispatcher(config)
}

#[cfg(not(target_os = "windows"))]
pub fn run_install(config: &ServiceConfig) -> Result<()> {
    anyhow::bail!("cannot install {}: no service manager on this platform", config.service_name)
}

#[cfg(not(target_os = "windows"))]
pub fn run_uninstall(config: &ServiceConfig) -> Result<()> {
    anyhow::bail!("cannot uninstall {}: no service manager on this platform", config.service_name)
}

#[cfg(not(target_os = "windows"))]
pub fn run_service(config: ServiceConfig) -> Result<()> {
    anyhow::bail!("cannot host {}: no service manager on this platform", config.service_name)
}
