//! Per-service database accessors.
//!
//! Each accessor looks its service up in the registry held by `AppState`
//! and hands back the registered manager as-is. A missing manager becomes
//! `AppError::ServiceUnavailable`, which renders as a 500 naming the service.

use actix_web::{HttpMessage, HttpRequest};
use db_infra::{DatabaseManager, ServiceKey};
use tracing::warn;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Canonical lookup of a service's database manager.
pub fn require_manager(state: &AppState, service: ServiceKey) -> Result<DatabaseManager, AppError> {
    state.registry().get_manager(service).map_err(|e| {
        warn!(service = %service, error = %e, "database manager lookup failed");
        AppError::from(e)
    })
}

/// Service lookup made while serving a request, kept in request extensions
/// so the completion log can name the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLookup {
    pub service: ServiceKey,
    pub found: bool,
}

/// [`require_manager`], recording the outcome on `req`. The last lookup wins.
pub fn require_manager_for(
    req: &HttpRequest,
    state: &AppState,
    service: ServiceKey,
) -> Result<DatabaseManager, AppError> {
    let result = require_manager(state, service);
    req.extensions_mut().insert(ServiceLookup {
        service,
        found: result.is_ok(),
    });
    result
}

pub fn get_users_db(state: &AppState) -> Result<DatabaseManager, AppError> {
    require_manager(state, ServiceKey::Users)
}

pub fn get_orders_db(state: &AppState) -> Result<DatabaseManager, AppError> {
    require_manager(state, ServiceKey::Orders)
}

pub fn get_analytics_db(state: &AppState) -> Result<DatabaseManager, AppError> {
    require_manager(state, ServiceKey::Analytics)
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use actix_web::ResponseError;

    use super::*;
    use crate::infra::state::build_state;
    use crate::test_support::detached_manager;

    type Accessor = fn(&AppState) -> Result<DatabaseManager, AppError>;

    const ACCESSORS: [(ServiceKey, Accessor); 3] = [
        (ServiceKey::Users, get_users_db),
        (ServiceKey::Orders, get_orders_db),
        (ServiceKey::Analytics, get_analytics_db),
    ];

    #[tokio::test]
    async fn each_accessor_returns_the_registered_manager() {
        for (service, accessor) in ACCESSORS {
            let manager = detached_manager(service);
            let state = build_state().with_manager(manager.clone()).build().await.unwrap();

            let found = accessor(&state).unwrap();
            assert!(found.same_instance(&manager), "{service}");
        }
    }

    #[tokio::test]
    async fn each_accessor_fails_when_manager_missing() {
        let state = build_state().build().await.unwrap();

        for (service, accessor) in ACCESSORS {
            let err = accessor(&state).unwrap_err();
            assert!(matches!(err, AppError::ServiceUnavailable { service: s } if s == service));
            assert!(err.detail().contains(service.display_name()));
            assert_eq!(
                err.error_response().status(),
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[tokio::test]
    async fn lookups_are_idempotent() {
        let orders = detached_manager(ServiceKey::Orders);
        let state = build_state().with_manager(orders).build().await.unwrap();

        let first = get_orders_db(&state).unwrap();
        let second = get_orders_db(&state).unwrap();
        assert!(first.same_instance(&second));
    }

    #[tokio::test]
    async fn only_users_registered() {
        let h1 = detached_manager(ServiceKey::Users);
        let state = build_state().with_manager(h1.clone()).build().await.unwrap();

        assert!(get_users_db(&state).unwrap().same_instance(&h1));

        let err = get_orders_db(&state).unwrap_err();
        assert_eq!(err.to_string(), "Orders database not initialized");
    }

    #[tokio::test]
    async fn lookup_outcome_is_recorded_on_the_request() {
        let state = build_state()
            .with_manager(detached_manager(ServiceKey::Users))
            .build()
            .await
            .unwrap();
        let req = TestRequest::default().to_http_request();
        assert!(req.extensions().get::<ServiceLookup>().is_none());

        require_manager_for(&req, &state, ServiceKey::Users).unwrap();
        assert_eq!(
            req.extensions().get::<ServiceLookup>().copied(),
            Some(ServiceLookup {
                service: ServiceKey::Users,
                found: true
            })
        );

        require_manager_for(&req, &state, ServiceKey::Analytics).unwrap_err();
        assert_eq!(
            req.extensions().get::<ServiceLookup>().copied(),
            Some(ServiceLookup {
                service: ServiceKey::Analytics,
                found: false
            })
        );
    }
}
