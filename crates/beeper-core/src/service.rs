//! One service run, from registration to the final Stopped.

use std::sync::Arc;

use tracing::{error, info};

use beeper_platform::service::{ControlSink, ServiceHost};

use crate::config::ServiceConfig;
use crate::controller::LifecycleController;
use crate::error::ServiceError;
use crate::worker::{self, WorkerReport, Workload};

/// Host the service until it is stopped.
///
/// Nothing is published and no worker is started if registration fails.
pub fn run(
    host: &dyn ServiceHost,
    config: &ServiceConfig,
    workload: &mut dyn Workload,
) -> Result<WorkerReport, ServiceError> {
    let identity = config.identity();
    let controller = Arc::new(LifecycleController::new(identity.clone()));

    let sink: Arc<dyn ControlSink> = controller.clone();
    let reporter = host
        .register(&identity, sink)
        .map_err(|source| ServiceError::Registration {
            service: identity.name().to_string(),
            source,
        })?;
    controller.attach(reporter);

    let signal = controller.begin_start();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("service {}: cannot start worker runtime: {}", identity, e);
            drop(signal);
            controller.finish();
            return Err(ServiceError::Runtime(e));
        }
    };

    controller.mark_running();

    let interval = config.work_interval();
    info!("worker started, interval {:?}", interval);
    let report = runtime.block_on(worker::run(&controller, &signal, interval, workload));
    drop(signal);

    controller.finish();
    Ok(report)
}
