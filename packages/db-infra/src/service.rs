use core::fmt;
use std::str::FromStr;

use crate::error::DbInfraError;

/// Logical services that each own a database manager.
///
/// The set is closed: handlers and configuration can only ever name one of
/// these, and the string forms are the registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKey {
    Users,
    Orders,
    Analytics,
}

impl ServiceKey {
    pub const ALL: [ServiceKey; 3] = [ServiceKey::Users, ServiceKey::Orders, ServiceKey::Analytics];

    /// Registry key, as used in configuration and URLs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Orders => "orders",
            Self::Analytics => "analytics",
        }
    }

    /// Human-readable name used in error messages.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Orders => "Orders",
            Self::Analytics => "Analytics",
        }
    }

    pub const fn default_schema(&self) -> &'static str {
        self.as_str()
    }

    /// Environment variable that overrides this service's schema name.
    pub const fn schema_env_var(&self) -> &'static str {
        match self {
            Self::Users => "USERS_DB_SCHEMA",
            Self::Orders => "ORDERS_DB_SCHEMA",
            Self::Analytics => "ANALYTICS_DB_SCHEMA",
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKey {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        ServiceKey::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(key))
            .ok_or_else(|| DbInfraError::UnknownService {
                key: key.to_string(),
            })
    }
}
