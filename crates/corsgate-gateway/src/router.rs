//! Axum router wiring.
//!
//! Every route sits behind the CORS layer; `bypass_paths` in config decides
//! which ones skip it.

use axum::{routing::get, Router};

use crate::{app_state::AppState, middleware::CorsLayer, ops};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new(state.cors()).with_metrics(state.metrics());

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
        .layer(cors)
}

async fn index() -> &'static str {
    "ok"
}
