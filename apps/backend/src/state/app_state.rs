use std::sync::Arc;

use db_infra::{DbInfrastructure, ManagerRegistry};

/// Application state shared by every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Per-service database managers, looked up once per request.
    registry: Arc<dyn ManagerRegistry>,
    /// Set when this state connected the registry itself and must close it.
    owned: Option<Arc<DbInfrastructure>>,
}

impl AppState {
    pub fn new(registry: Arc<dyn ManagerRegistry>) -> Self {
        Self {
            registry,
            owned: None,
        }
    }

    /// State over a registry it connected itself; `close` shuts it down.
    pub fn owning(infra: Arc<DbInfrastructure>) -> Self {
        Self {
            registry: infra.clone(),
            owned: Some(infra),
        }
    }

    /// State whose registry has no managers; every lookup fails.
    pub fn empty() -> Self {
        Self::new(Arc::new(DbInfrastructure::new()))
    }

    pub fn registry(&self) -> &dyn ManagerRegistry {
        self.registry.as_ref()
    }

    /// Closes the owned registry's managers and pool. No-op for borrowed registries.
    pub async fn close(&self) {
        if let Some(infra) = &self.owned {
            infra.close_all().await;
        }
    }
}
