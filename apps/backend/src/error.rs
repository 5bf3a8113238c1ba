use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use db_infra::{DbInfraError, ServiceKey};
use serde::Serialize;
use thiserror::Error;

use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{} database not initialized", .service.display_name())]
    ServiceUnavailable { service: ServiceKey },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            AppError::BadRequest { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Db { .. } => ErrorCode::DbError,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Client-facing detail line.
    pub fn detail(&self) -> String {
        match self {
            AppError::ServiceUnavailable { service } => {
                format!("{} database not initialized", service.display_name())
            }
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Db { detail } => detail.clone(),
            AppError::Internal { detail } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ServiceUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Db { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn service_unavailable(service: ServiceKey) -> Self {
        Self::ServiceUnavailable { service }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DbInfraError> for AppError {
    fn from(e: DbInfraError) -> Self {
        match e {
            DbInfraError::ManagerNotFound { service } => AppError::service_unavailable(service),
            DbInfraError::UnknownService { key } => AppError::bad_request(
                ErrorCode::UnknownService,
                format!("Unknown service: '{key}'"),
            ),
            DbInfraError::Config { message } => AppError::config(message),
            e @ (DbInfraError::Connect { .. } | DbInfraError::Query { .. }) => {
                AppError::db(e.to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://shopfront.app/errors/{code}"),
            title: Self::humanize_code(code.as_str()),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use serde_json::Value;

    use super::*;

    #[test]
    fn missing_manager_maps_to_service_unavailable() {
        let err: AppError = DbInfraError::ManagerNotFound {
            service: ServiceKey::Orders,
        }
        .into();

        assert!(matches!(
            err,
            AppError::ServiceUnavailable {
                service: ServiceKey::Orders
            }
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.detail(), "Orders database not initialized");
        assert_eq!(err.to_string(), "Orders database not initialized");
    }

    #[test]
    fn unknown_service_is_a_bad_request() {
        let err: AppError = DbInfraError::UnknownService {
            key: "billing".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::UnknownService);
        assert!(err.detail().contains("billing"));
    }

    #[test]
    fn query_failures_map_to_db_error() {
        let err: AppError = DbInfraError::Query {
            service: ServiceKey::Users,
            message: "connection reset".to_string(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::DbError);
        assert!(err.detail().contains("connection reset"));
    }

    #[test]
    fn humanizes_codes() {
        assert_eq!(
            AppError::humanize_code("SERVICE_UNAVAILABLE"),
            "Service Unavailable"
        );
        assert_eq!(AppError::humanize_code("INTERNAL"), "Internal");
    }

    #[actix_web::test]
    async fn error_response_is_problem_json() {
        let resp = AppError::service_unavailable(ServiceKey::Analytics).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
        assert_eq!(resp.headers().get("x-trace-id").unwrap(), "unknown");

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(json["title"], "Service Unavailable");
        assert_eq!(json["status"], 500);
        assert_eq!(json["detail"], "Analytics database not initialized");
        assert_eq!(
            json["type"],
            "https://shopfront.app/errors/SERVICE_UNAVAILABLE"
        );
    }
}
