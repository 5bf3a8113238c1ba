//! One `request_completed` line per request.
//!
//! Besides the HTTP basics, the line names the service database the handler
//! asked for (`db.service`) and whether a manager was registered for it
//! (`db.found`), so a 500 from an uninitialized service is attributable
//! without reading the response body.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn, Level};

use crate::db::ServiceLookup;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let entry = CompletionLog::begin(&req);
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            match &result {
                // Extractors run inside the handler, so the lookup is only
                // visible on the response's request.
                Ok(res) => {
                    let lookup = res.request().extensions().get::<ServiceLookup>().copied();
                    entry.finish(res.status(), lookup);
                }
                Err(err) => entry.finish(err.as_response_error().status_code(), None),
            }

            result
        })
    }
}

/// Request facts captured before the inner service consumes the request.
struct CompletionLog {
    method: String,
    path: String,
    trace_id: String,
    start: Instant,
}

impl CompletionLog {
    fn begin(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            trace_id: req
                .extensions()
                .get::<String>()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            start: Instant::now(),
        }
    }

    fn finish(self, status: StatusCode, lookup: Option<ServiceLookup>) {
        let duration_us = self.start.elapsed().as_micros() as u64;
        let status_code = status.as_u16();
        let service = lookup.map(|l| l.service.as_str());
        let found = lookup.map(|l| l.found);

        let (method, path, trace_id) = (&self.method, &self.path, &self.trace_id);

        let level = completion_level(status, lookup);
        if level == Level::ERROR {
            error!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, db.service=service, db.found=found, message="request_completed");
        } else if level == Level::WARN {
            warn!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, db.service=service, db.found=found, message="request_completed");
        } else {
            info!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, db.service=service, db.found=found, message="request_completed");
        }
    }
}

/// Server errors log at error, client errors at warn. A successful request
/// that still hit an unregistered service (e.g. a handler that tolerated the
/// rejection) is raised to warn.
fn completion_level(status: StatusCode, lookup: Option<ServiceLookup>) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() || lookup.is_some_and(|l| !l.found) {
        Level::WARN
    } else {
        Level::INFO
    }
}
