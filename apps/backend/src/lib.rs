#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod db;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trace_ctx;

// Re-exports for public API
pub use db::{
    get_analytics_db, get_orders_db, get_users_db, require_manager, require_manager_for,
    ServiceLookup,
};
pub use error::AppError;
pub use errors::ErrorCode;
pub use extractors::{AnalyticsDb, OrdersDb, UsersDb};
pub use infra::state::{bootstrap_registry, build_state};
pub use middleware::{RequestTrace, StructuredLogger, TraceSpan};
pub use state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
