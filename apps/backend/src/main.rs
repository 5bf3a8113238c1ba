use actix_web::{web, App, HttpServer};
use db_infra::DbSettings;
use shopfront::infra::state::build_state;
use shopfront::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use shopfront::routes;
use shopfront::telemetry;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or sourced manually for local dev).
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let settings = match DbSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Invalid database configuration: {e}");
            std::process::exit(1);
        }
    };

    let state = match build_state().with_settings(settings).build().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to initialize databases: {e}");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(state);
    let server_data = data.clone();

    info!(%host, port, "starting backend");

    let result = HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(server_data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    data.close().await;
    info!("database managers closed");

    result
}
