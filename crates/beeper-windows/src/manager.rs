//! Windows Service Control Manager (SCM): create, query and delete the service registration.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use windows_service::service::{
    Service, ServiceAccess, ServiceErrorControl, ServiceInfo, ServiceStartType, ServiceType,
};
use windows_service::service_manager::{
    ServiceManager as ScmConnection, ServiceManagerAccess,
};

use beeper_platform::service::{
    ServiceIdentity, ServiceManager, ServiceRecord, ServiceState, StartPolicy,
};

use crate::service::service_state;

/// Registration records on the local computer's SCM.
pub struct WindowsServiceManager;

impl WindowsServiceManager {
    fn connect(access: ServiceManagerAccess) -> Result<ScmConnection> {
        ScmConnection::local_computer(None::<&str>, access)
            .context("failed to connect to the service control manager")
    }
}

fn start_type(start: StartPolicy) -> ServiceStartType {
    match start {
        StartPolicy::Automatic => ServiceStartType::AutoStart,
        StartPolicy::OnDemand => ServiceStartType::OnDemand,
        StartPolicy::Disabled => ServiceStartType::Disabled,
    }
}

impl ServiceManager for WindowsServiceManager {
    fn create_service(
        &self,
        identity: &ServiceIdentity,
        executable: &Path,
        start: StartPolicy,
    ) -> Result<()> {
        let scm = Self::connect(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?;

        let info = ServiceInfo {
            name: OsString::from(identity.name()),
            display_name: OsString::from(identity.name()),
            service_type: ServiceType::OWN_PROCESS,
            start_type: start_type(start),
            error_control: ServiceErrorControl::Ignore,
            executable_path: executable.to_path_buf(),
            launch_arguments: Vec::new(),
            dependencies: Vec::new(),
            account_name: None,
            account_password: None,
        };

        scm.create_service(&info, ServiceAccess::QUERY_STATUS)
            .context("CreateService failed")?;
        debug!("created SCM record for {}", identity);
        Ok(())
    }

    fn open_service(&self, identity: &ServiceIdentity) -> Result<Box<dyn ServiceRecord>> {
        let scm = Self::connect(ServiceManagerAccess::CONNECT)?;
        let service = scm
            .open_service(
                identity.name(),
                ServiceAccess::QUERY_STATUS | ServiceAccess::DELETE,
            )
            .context("OpenService failed")?;
        Ok(Box::new(ScmRecord { service }))
    }
}

/// One SCM service handle, used for both the state check and the delete.
struct ScmRecord {
    service: Service,
}

impl ServiceRecord for ScmRecord {
    fn query_state(&self) -> Result<ServiceState> {
        let status = self
            .service
            .query_status()
            .context("QueryServiceStatus failed")?;
        Ok(service_state(status.current_state))
    }

    fn delete(&self) -> Result<()> {
        self.service.delete().context("DeleteService failed")?;
        debug!("deleted SCM record");
        Ok(())
    }
}
