//! Per-service database managers and the process-wide registry that owns them.
//! Used by the backend to hand one manager per service to request handlers.

pub mod config;
pub mod error;
pub mod infra;
pub mod service;

pub use config::db::{sanitize_db_url, DbSettings, RuntimeEnv};
pub use error::DbInfraError;
pub use infra::db::{DatabaseManager, DbInfrastructure, ManagerRegistry};
pub use service::ServiceKey;
