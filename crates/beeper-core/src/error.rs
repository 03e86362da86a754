use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The control callback could not be registered. This is what happens
    /// when the process was not launched by the service manager.
    #[error("failed to register control handler for service {service}")]
    Registration {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to build worker runtime")]
    Runtime(#[source] std::io::Error),
}
