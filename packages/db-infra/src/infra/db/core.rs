use std::future::Future;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{sanitize_db_url, DbSettings};
use crate::error::DbInfraError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 500;

pub(crate) async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| DbInfraError::Connect {
        message: "no connection attempts were made".to_string(),
    }))
}

/// Builds the pool shared by every service's manager.
pub async fn build_pool(settings: &DbSettings) -> Result<DatabaseConnection, DbInfraError> {
    let mut opt = ConnectOptions::new(settings.url.clone());
    opt.min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);

    let target = sanitize_db_url(&settings.url);
    let pool = retry_connection(
        || {
            let opt = opt.clone();
            let target = target.clone();
            async move {
                Database::connect(opt)
                    .await
                    .map_err(|e| DbInfraError::Connect {
                        message: format!("failed to connect to {target}: {e}"),
                    })
            }
        },
        CONNECT_ATTEMPTS,
        CONNECT_INTERVAL_MS,
    )
    .await?;

    info!(
        db = %target,
        max_connections = settings.max_connections,
        "database pool ready"
    );
    Ok(pool)
}
