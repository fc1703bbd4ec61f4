//! Shared application state for the corsgate gateway.

use std::sync::Arc;

use corsgate_core::error::Result;
use corsgate_core::Cors;

use crate::config::GatewayConfig;
use crate::obs::metrics::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    cors: Arc<Cors>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Compile the CORS policy from config.
    /// Returns Result so main can report bad policies without panicking.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let cors = Cors::new(cfg.cors.to_options())?;

        if cors.reflects_any_origin() {
            tracing::warn!("cors: wildcard origin with credentials reflects any request origin");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                cors: Arc::new(cors),
                metrics: Arc::new(GatewayMetrics::default()),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn cors(&self) -> Arc<Cors> {
        Arc::clone(&self.inner.cors)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.inner.metrics)
    }
}
