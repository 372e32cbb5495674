//! Tracing setup for the engine service.
//!
//! `LOG_LEVEL` takes an `EnvFilter` directive string; when unset or invalid the
//! engine defaults below apply. `LOG_FORMAT=json` switches to structured JSON
//! lines, anything else prints human-readable output.
//!
//! Targets in use:
//!   challenge_engine : process lifecycle, WebSocket connections
//!   challenge        : content loading, sessions, grading
//!   engine           : widget mounting, input routing, media commands

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,challenge=debug,challenge_engine=debug,tower_http=info,axum=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env_value(v: Option<&str>) -> Self {
        match v.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // `try_init` so a second call (tests, embedding) is a no-op.
    let res = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if res.is_ok() {
        tracing::debug!(target: "challenge_engine", ?format, "Tracing initialized");
    }
}
