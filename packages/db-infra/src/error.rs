use thiserror::Error;

use crate::service::ServiceKey;

#[derive(Debug, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("Unknown service: '{key}'")]
    UnknownService { key: String },
    #[error("No database manager registered for service '{service}'")]
    ManagerNotFound { service: ServiceKey },
    #[error("Connection error: {message}")]
    Connect { message: String },
    #[error("Query error on '{service}': {message}")]
    Query { service: ServiceKey, message: String },
}

impl DbInfraError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
