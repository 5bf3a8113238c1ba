use std::fmt;
use std::future::{ready, Ready};
use std::marker::PhantomData;
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use db_infra::{DatabaseManager, ServiceKey};

use crate::db::require_manager_for;
use crate::error::AppError;
use crate::state::app_state::AppState;

/// A service whose database manager can be injected into handlers.
pub trait DbService {
    const KEY: ServiceKey;
}

pub struct Users;
pub struct Orders;
pub struct Analytics;

impl DbService for Users {
    const KEY: ServiceKey = ServiceKey::Users;
}

impl DbService for Orders {
    const KEY: ServiceKey = ServiceKey::Orders;
}

impl DbService for Analytics {
    const KEY: ServiceKey = ServiceKey::Analytics;
}

/// Database manager for service `S`, resolved once per request.
///
/// Rejects with `ServiceUnavailable` (500) when the registry has no
/// manager for `S`.
pub struct ServiceDb<S: DbService> {
    manager: DatabaseManager,
    _service: PhantomData<fn() -> S>,
}

pub type UsersDb = ServiceDb<Users>;
pub type OrdersDb = ServiceDb<Orders>;
pub type AnalyticsDb = ServiceDb<Analytics>;

impl<S: DbService> ServiceDb<S> {
    fn extract(req: &HttpRequest) -> Result<Self, AppError> {
        let app_state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AppError::internal("AppState not available"))?;

        let manager = require_manager_for(req, app_state, S::KEY)?;
        Ok(Self {
            manager,
            _service: PhantomData,
        })
    }

    pub fn into_inner(self) -> DatabaseManager {
        self.manager
    }
}

impl<S: DbService> Deref for ServiceDb<S> {
    type Target = DatabaseManager;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

impl<S: DbService> fmt::Debug for ServiceDb<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceDb").field(&self.manager).finish()
    }
}

impl<S: DbService> FromRequest for ServiceDb<S> {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}
