use actix_web::{web, HttpRequest, HttpResponse};
use db_infra::{DatabaseManager, ServiceKey};
use serde::Serialize;

use crate::db::require_manager_for;
use crate::error::AppError;
use crate::extractors::service_db::{AnalyticsDb, OrdersDb, UsersDb};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct DatabaseInfo {
    pub service: &'static str,
    pub schema: String,
    pub backend: Option<String>,
}

impl From<&DatabaseManager> for DatabaseInfo {
    fn from(manager: &DatabaseManager) -> Self {
        Self {
            service: manager.service().as_str(),
            schema: manager.schema().to_string(),
            backend: manager.backend_name(),
        }
    }
}

async fn users_db(db: UsersDb) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(DatabaseInfo::from(&*db)))
}

async fn orders_db(db: OrdersDb) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(DatabaseInfo::from(&*db)))
}

async fn analytics_db(db: AnalyticsDb) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(DatabaseInfo::from(&*db)))
}

async fn database_by_key(
    req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service: ServiceKey = path.parse()?;
    let manager = require_manager_for(&req, &app_state, service)?;
    Ok(HttpResponse::Ok().json(DatabaseInfo::from(&manager)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/db", web::get().to(users_db))
        .route("/orders/db", web::get().to(orders_db))
        .route("/analytics/db", web::get().to(analytics_db))
        .route("/databases/{service}", web::get().to(database_by_key));
}
