use actix_web::{web, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod health;
pub mod services;

async fn not_found(req: HttpRequest) -> Result<&'static str, AppError> {
    Err(AppError::not_found(
        ErrorCode::NotFound,
        format!("No route for {} {}", req.method(), req.path()),
    ))
}

/// Registers every application route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health, /health/databases
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Per-service database routes: /api/**
    cfg.service(web::scope("/api").configure(services::configure_routes));

    cfg.default_service(web::to(not_found));
}
