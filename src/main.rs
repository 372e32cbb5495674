//! Challenge Interaction Engine · lesson service
//!
//! - Headless challenge engine driven over WebSocket (one session per connection)
//! - Read-only HTTP API for challenges and default audio settings
//! - Static front end fallback (./static/index.html)
//!
//! Environment:
//!   PORT               : u16 (default 3000)
//!   ENGINE_CONFIG_PATH : TOML with audio defaults, reveal policy and a challenge bank
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod content;
mod engine;
mod session;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::routes::build_router;
use crate::state::AppState;

const DEFAULT_PORT: u16 = 3000;

fn listen_addr() -> SocketAddr {
  let port = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .unwrap_or(DEFAULT_PORT);
  SocketAddr::from(([0, 0, 0, 0], port))
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "challenge_engine", error = %e, "Ctrl-C handler unavailable; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "challenge_engine", "Shutdown signal received");
}

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Challenge store, audio defaults, reveal policy.
  let state = Arc::new(AppState::new());
  let app = build_router(state.clone());

  let addr = listen_addr();
  let listener = TcpListener::bind(addr).await?;
  info!(target: "challenge_engine", %addr, lesson = %state.default_lesson, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "challenge_engine", "Server stopped");
  Ok(())
}
