use std::env;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::DbInfraError;
use crate::service::ServiceKey;

/// Userinfo escaping: everything but RFC 3986 unreserved characters.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Runtime environment, selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Prod,
    /// Enforces that the target database name ends with `_test`.
    Test,
}

/// One service's slice of the shared database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub service: ServiceKey,
    pub schema: String,
}

/// Everything needed to build the registry from scratch.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub env: RuntimeEnv,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub services: Vec<ServiceSettings>,
}

impl std::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("env", &self.env)
            .field("url", &sanitize_db_url(&self.url))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("services", &self.services)
            .finish()
    }
}

impl DbSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, DbInfraError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns `None` for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbInfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV").as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("test") => RuntimeEnv::Test,
            _ => RuntimeEnv::Prod,
        };

        let url = match lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => url.trim().to_string(),
            None => assemble_url(&lookup)?,
        };

        if env == RuntimeEnv::Test {
            let db_name = database_name(&url);
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test environment requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
        }

        let max_connections = parse_number(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        if max_connections == 0 {
            return Err(DbInfraError::config("DB_MAX_CONNECTIONS must be at least 1"));
        }
        let min_connections = parse_number(&lookup, "DB_MIN_CONNECTIONS", 1)?;
        if min_connections > max_connections {
            return Err(DbInfraError::config(format!(
                "DB_MIN_CONNECTIONS ({min_connections}) exceeds DB_MAX_CONNECTIONS ({max_connections})"
            )));
        }
        let acquire_timeout =
            Duration::from_secs(parse_number(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?.into());

        let keys = match lookup("DB_SERVICES").filter(|v| !v.trim().is_empty()) {
            Some(list) => parse_service_list(&list)?,
            None => ServiceKey::ALL.to_vec(),
        };
        if keys.is_empty() {
            return Err(DbInfraError::config(
                "DB_SERVICES must name at least one service",
            ));
        }

        let services = keys
            .into_iter()
            .map(|service| {
                let schema = lookup(service.schema_env_var())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| service.default_schema().to_string());
                validate_schema_name(&schema)?;
                Ok(ServiceSettings { service, schema })
            })
            .collect::<Result<Vec<_>, DbInfraError>>()?;

        Ok(Self {
            env,
            url,
            max_connections,
            min_connections,
            acquire_timeout,
            services,
        })
    }
}

fn assemble_url<F>(lookup: &F) -> Result<String, DbInfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());
    let db_name = must_var(lookup, "POSTGRES_DB")?;
    let username = must_var(lookup, "POSTGRES_USER")?;
    let password = must_var(lookup, "POSTGRES_PASSWORD")?;

    let password = utf8_percent_encode(&password, USERINFO);
    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

fn must_var<F>(lookup: &F, name: &str) -> Result<String, DbInfraError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}

fn parse_number<F>(lookup: &F, name: &str, default: u32) -> Result<u32, DbInfraError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
            DbInfraError::config(format!("{name} must be a non-negative integer, got: '{raw}'"))
        }),
    }
}

fn parse_service_list(list: &str) -> Result<Vec<ServiceKey>, DbInfraError> {
    let mut services = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let service = part.parse::<ServiceKey>()?;
        if !services.contains(&service) {
            services.push(service);
        }
    }
    Ok(services)
}

fn validate_schema_name(schema: &str) -> Result<(), DbInfraError> {
    let mut chars = schema.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(DbInfraError::config(format!(
            "Invalid schema name '{schema}': expected [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}

/// Database name is the last path segment, minus any query string.
fn database_name(url: &str) -> &str {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query.rsplit('/').next().unwrap_or("")
}

/// Sanitize database URL by masking the password.
/// Used whenever a connection string ends up in a log line.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let Some((scheme, credentials)) = auth_part.split_once("://") else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host_part}"),
        None => url.to_string(),
    }
}
