use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::config::db::{sanitize_db_url, DbSettings};
use crate::error::DbInfraError;
use crate::infra::db::core::build_pool;
use crate::infra::db::manager::DatabaseManager;
use crate::service::ServiceKey;

/// Lookup capability handed to request-handling code.
pub trait ManagerRegistry: Send + Sync + fmt::Debug {
    /// Fails with [`DbInfraError::ManagerNotFound`] when nothing is registered
    /// under `service`.
    fn get_manager(&self, service: ServiceKey) -> Result<DatabaseManager, DbInfraError>;

    /// Registered services, in [`ServiceKey::ALL`] order.
    fn registered(&self) -> Vec<ServiceKey>;
}

/// Process-wide registry of per-service database managers.
#[derive(Default)]
pub struct DbInfrastructure {
    managers: RwLock<HashMap<ServiceKey, DatabaseManager>>,
    pool: RwLock<Option<DatabaseConnection>>,
}

impl DbInfrastructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the shared pool and registers one manager per configured service.
    pub async fn initialize(settings: &DbSettings) -> Result<Self, DbInfraError> {
        let pool = build_pool(settings).await?;
        let infra = Self::new();

        for service_settings in &settings.services {
            let manager = DatabaseManager::new(
                service_settings.service,
                service_settings.schema.clone(),
                pool.clone(),
            );
            manager.ensure_schema().await?;
            infra.register(manager);
            info!(
                service = %service_settings.service,
                schema = %service_settings.schema,
                db = %sanitize_db_url(&settings.url),
                "database manager registered"
            );
        }

        *infra.pool.write() = Some(pool);
        Ok(infra)
    }

    /// Registers `manager` under its service, returning the one it replaced.
    pub fn register(&self, manager: DatabaseManager) -> Option<DatabaseManager> {
        self.managers.write().insert(manager.service(), manager)
    }

    pub fn remove(&self, service: ServiceKey) -> Option<DatabaseManager> {
        self.managers.write().remove(&service)
    }

    pub fn is_empty(&self) -> bool {
        self.managers.read().is_empty()
    }

    /// Unregisters every manager and closes the shared pool.
    pub async fn close_all(&self) {
        let drained: Vec<ServiceKey> = self.managers.write().drain().map(|(k, _)| k).collect();
        for service in drained {
            info!(service = %service, "database manager unregistered");
        }

        let pool = self.pool.write().take();
        if let Some(pool) = pool {
            if let Err(e) = pool.close().await {
                warn!(error = %e, "failed to close shared database pool");
            }
        }
    }
}

impl ManagerRegistry for DbInfrastructure {
    fn get_manager(&self, service: ServiceKey) -> Result<DatabaseManager, DbInfraError> {
        self.managers
            .read()
            .get(&service)
            .cloned()
            .ok_or(DbInfraError::ManagerNotFound { service })
    }

    fn registered(&self) -> Vec<ServiceKey> {
        let managers = self.managers.read();
        ServiceKey::ALL
            .into_iter()
            .filter(|service| managers.contains_key(service))
            .collect()
    }
}

impl fmt::Debug for DbInfrastructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbInfrastructure")
            .field("registered", &self.registered())
            .field("pooled", &self.pool.read().is_some())
            .finish()
    }
}
