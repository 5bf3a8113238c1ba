use std::sync::Arc;

use db_infra::{DatabaseManager, DbInfrastructure, DbSettings, ManagerRegistry};
use tracing::info;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Connects the shared pool and registers every configured service.
pub async fn bootstrap_registry(settings: &DbSettings) -> Result<Arc<DbInfrastructure>, AppError> {
    let infra = DbInfrastructure::initialize(settings).await?;
    info!(services = ?infra.registered(), "database registry initialized");
    Ok(Arc::new(infra))
}

/// Builder for creating AppState instances (used in both tests and main)
#[derive(Default)]
pub struct StateBuilder {
    settings: Option<DbSettings>,
    registry: Option<Arc<dyn ManagerRegistry>>,
    managers: Vec<DatabaseManager>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a fresh registry from `settings` at build time. Takes precedence
    /// over `with_registry` and `with_manager`.
    pub fn with_settings(mut self, settings: DbSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Use an existing registry. Takes precedence over `with_manager`.
    pub fn with_registry(mut self, registry: Arc<dyn ManagerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register `manager` in a fresh in-process registry.
    pub fn with_manager(mut self, manager: DatabaseManager) -> Self {
        self.managers.push(manager);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        if let Some(settings) = self.settings {
            // single entrypoint: connect + register every configured service
            let infra = bootstrap_registry(&settings).await?;
            return Ok(AppState::owning(infra));
        }

        if let Some(registry) = self.registry {
            return Ok(AppState::new(registry));
        }

        let infra = DbInfrastructure::new();
        for manager in self.managers {
            infra.register(manager);
        }
        Ok(AppState::new(Arc::new(infra)))
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
