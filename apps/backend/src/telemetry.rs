//! Process-wide tracing subscriber.
//!
//! `RUST_LOG` overrides the filter. `LOG_FORMAT=pretty` swaps the JSON lines
//! for human-readable output during local development.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Registry and pool lifecycle logs from `db_infra` stay at info.
const DEFAULT_FILTER: &str = "info,actix_web=info,db_infra=info,sqlx=warn,sea_orm=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Unset or unrecognized values fall back to JSON.
    pub fn from_value(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("pretty") || v.eq_ignore_ascii_case("text") => {
                LogFormat::Pretty
            }
            _ => LogFormat::Json,
        }
    }
}

fn env_filter(raw: Option<&str>) -> EnvFilter {
    raw.filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref());
    let format = LogFormat::from_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let json_layer = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false)
            .json()
    });
    let pretty_layer = (format == LogFormat::Pretty).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();
}
