//! corsgate gateway
//!
//! Serves a demo route behind the CORS middleware.
//! - Config: `corsgate.yaml` (override with `CORSGATE_CONFIG`)
//! - Logging: `RUST_LOG` (e.g. `RUST_LOG=corsgate_gateway=debug`)

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use corsgate_core::error::{CorsGateError, Result};
use corsgate_gateway::{app_state::AppState, config, router};

const DEFAULT_CONFIG_PATH: &str = "corsgate.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %e, "corsgate-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("CORSGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "corsgate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| CorsGateError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| CorsGateError::Internal(format!("server failed: {e}")))
}
