//! Helpers shared by unit and integration tests.
//!
//! Managers built here wrap a disconnected sea-orm connection, so handlers
//! and extractors can be exercised without a running database.

pub mod app_builder;

use std::sync::Arc;

use db_infra::{DatabaseManager, DbInfrastructure, ServiceKey};
use sea_orm::DatabaseConnection;

pub use app_builder::create_test_app_builder;

/// Manager for `service` under its default schema, with no live connection.
pub fn detached_manager(service: ServiceKey) -> DatabaseManager {
    DatabaseManager::new(
        service,
        service.default_schema(),
        DatabaseConnection::Disconnected,
    )
}

/// Registry holding one detached manager per listed service.
pub fn registry_with(services: &[ServiceKey]) -> Arc<DbInfrastructure> {
    let infra = DbInfrastructure::new();
    for &service in services {
        infra.register(detached_manager(service));
    }
    Arc::new(infra)
}
