//! Hands the process's main thread to the SCM dispatcher.
//!
//! The dispatcher calls back into a plain `extern "system"` entry point that
//! cannot capture anything, so the configuration is parked in a write-once
//! cell before dispatching and read back on the service thread.

use std::ffi::OsString;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use windows_service::{define_windows_service, service_dispatcher};

use beeper_core::config::ServiceConfig;
use beeper_core::error::ServiceError;
use beeper_core::service;

use crate::beep::BeepWorkload;
use crate::service::ScmHost;

static SERVICE_CONFIG: OnceLock<ServiceConfig> = OnceLock::new();

define_windows_service!(ffi_service_main, service_main);

/// Block until every service hosted by this process has stopped.
///
/// Fails straight away when the process was not started by the SCM.
pub fn run_dispatcher(config: ServiceConfig) -> Result<()> {
    let name = config.service_name.clone();
    if SERVICE_CONFIG.set(config).is_err() {
        anyhow::bail!("service dispatcher already started");
    }
    service_dispatcher::start(&name, ffi_service_main)
        .context("StartServiceCtrlDispatcher failed")
}

fn service_main(_arguments: Vec<OsString>) {
    let Some(config) = SERVICE_CONFIG.get() else {
        error!("service entry point reached without configuration");
        return;
    };

    let mut workload = BeepWorkload::from_config(config);
    match service::run(&ScmHost, config, &mut workload) {
        Ok(report) => info!(
            "service run finished after {} beeps",
            report.performed
        ),
        Err(e @ ServiceError::Registration { .. }) => {
            debug!("not hosted by the service manager: {:#}", anyhow::Error::from(e));
        }
        Err(e) => error!("service run failed: {:#}", anyhow::Error::from(e)),
    }
}
