use std::fmt;
use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::debug;

use crate::error::DbInfraError;
use crate::service::ServiceKey;

const TABLE_PLACEHOLDER_OPEN: &str = "{{tables.";
const TABLE_PLACEHOLDER_CLOSE: &str = "}}";

/// Database manager for one service.
///
/// Cloning is cheap and yields the same instance: all clones share one inner
/// allocation, which is what [`DatabaseManager::same_instance`] compares.
/// Managers for different services may share one connection pool; each one
/// scopes its tables to its own schema through [`DatabaseManager::prepare`].
#[derive(Clone)]
pub struct DatabaseManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    service: ServiceKey,
    schema: String,
    conn: DatabaseConnection,
}

impl DatabaseManager {
    pub fn new(service: ServiceKey, schema: impl Into<String>, conn: DatabaseConnection) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                service,
                schema: schema.into(),
                conn,
            }),
        }
    }

    pub fn service(&self) -> ServiceKey {
        self.inner.service
    }

    pub fn schema(&self) -> &str {
        &self.inner.schema
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.inner.conn
    }

    /// Backend name, or `None` when the manager holds no live connection.
    pub fn backend_name(&self) -> Option<String> {
        match &self.inner.conn {
            DatabaseConnection::Disconnected => None,
            conn => Some(format!("{:?}", conn.get_database_backend()).to_lowercase()),
        }
    }

    /// True when both handles point at the same manager instance.
    pub fn same_instance(&self, other: &DatabaseManager) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Schema-qualified table name.
    pub fn qualify(&self, table: &str) -> String {
        format!("\"{}\".{}", self.inner.schema, table)
    }

    /// Rewrites `{{tables.<name>}}` placeholders into schema-qualified names.
    ///
    /// An unterminated placeholder is copied through unchanged.
    pub fn prepare(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut rest = sql;

        while let Some(start) = rest.find(TABLE_PLACEHOLDER_OPEN) {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + TABLE_PLACEHOLDER_OPEN.len()..];
            match after_open.find(TABLE_PLACEHOLDER_CLOSE) {
                Some(end) => {
                    out.push_str(&self.qualify(after_open[..end].trim()));
                    rest = &after_open[end + TABLE_PLACEHOLDER_CLOSE.len()..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Round-trips to the database.
    pub async fn ping(&self) -> Result<(), DbInfraError> {
        self.inner.conn.ping().await.map_err(|e| {
            debug!(service = %self.inner.service, error = %e, "ping failed");
            DbInfraError::Query {
                service: self.inner.service,
                message: e.to_string(),
            }
        })
    }

    /// Creates this manager's schema if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), DbInfraError> {
        let sql = format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", self.inner.schema);
        self.inner
            .conn
            .execute_unprepared(&sql)
            .await
            .map(|_| ())
            .map_err(|e| DbInfraError::Query {
                service: self.inner.service,
                message: format!("failed to create schema '{}': {e}", self.inner.schema),
            })
    }
}

impl fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("service", &self.inner.service)
            .field("schema", &self.inner.schema)
            .field("connected", &self.backend_name().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(schema: &str) -> DatabaseManager {
        DatabaseManager::new(ServiceKey::Orders, schema, DatabaseConnection::Disconnected)
    }

    #[test]
    fn clones_are_the_same_instance() {
        let a = manager("orders");
        let b = a.clone();
        let c = manager("orders");
        assert!(a.same_instance(&b));
        assert!(!a.same_instance(&c));
    }

    #[test]
    fn prepare_qualifies_table_placeholders() {
        let m = manager("orders_v2");
        assert_eq!(
            m.prepare("SELECT * FROM {{tables.orders}} o JOIN {{tables.lines}} l ON l.order_id = o.id"),
            "SELECT * FROM \"orders_v2\".orders o JOIN \"orders_v2\".lines l ON l.order_id = o.id"
        );
        assert_eq!(m.prepare("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn prepare_leaves_unterminated_placeholder() {
        let m = manager("orders");
        assert_eq!(
            m.prepare("SELECT * FROM {{tables.orders"),
            "SELECT * FROM {{tables.orders"
        );
    }

    #[test]
    fn disconnected_manager_has_no_backend() {
        let m = manager("orders");
        assert_eq!(m.backend_name(), None);
        assert!(format!("{m:?}").contains("connected: false"));
    }

    #[tokio::test]
    async fn ping_fails_without_connection() {
        let err = manager("orders").ping().await.unwrap_err();
        assert!(matches!(
            err,
            DbInfraError::Query {
                service: ServiceKey::Orders,
                ..
            }
        ));
    }
}
