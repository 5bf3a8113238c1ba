use actix_web::{web, HttpResponse};
use db_infra::ServiceKey;
use serde::Serialize;
use tracing::warn;

use crate::state::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ServiceStatus {
    Ok,
    NotInitialized,
    Unreachable,
}

#[derive(Debug, Serialize)]
struct ServiceHealth {
    service: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    status: ServiceStatus,
}

#[derive(Debug, Serialize)]
struct DatabaseHealthResponse {
    status: &'static str,
    services: Vec<ServiceHealth>,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn database_health(app_state: web::Data<AppState>) -> HttpResponse {
    let mut services = Vec::with_capacity(ServiceKey::ALL.len());

    for service in ServiceKey::ALL {
        let entry = match app_state.registry().get_manager(service) {
            Err(_) => ServiceHealth {
                service: service.as_str(),
                schema: None,
                status: ServiceStatus::NotInitialized,
            },
            Ok(manager) => {
                let status = match manager.ping().await {
                    Ok(()) => ServiceStatus::Ok,
                    Err(e) => {
                        warn!(service = %service, error = %e, "database health check failed");
                        ServiceStatus::Unreachable
                    }
                };
                ServiceHealth {
                    service: service.as_str(),
                    schema: Some(manager.schema().to_string()),
                    status,
                }
            }
        };
        services.push(entry);
    }

    let healthy = services.iter().all(|s| s.status == ServiceStatus::Ok);
    let body = DatabaseHealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        services,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health))
        .route("/databases", web::get().to(database_health));
}
