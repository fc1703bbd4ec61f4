//! CORS tower middleware.
//!
//! Splits each request into head + body, asks the compiled [`Cors`] policy for
//! an [`Outcome`], then either forwards untouched (bypass), answers `204`
//! directly (preflight), or forwards and annotates the response (simple).
//! Simple-path headers go underneath the handler's own: `Vary: Origin` comes
//! first and a handler-set `Access-Control-*` value wins.
//! Errors from the inner service are returned as-is.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::ORIGIN;
use http::{Request, Response, StatusCode};
use tower::{Layer, Service};

use corsgate_core::{Cors, Outcome};

use crate::obs::metrics::GatewayMetrics;

#[derive(Clone)]
pub struct CorsLayer {
    cors: Arc<Cors>,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl CorsLayer {
    pub fn new(cors: Arc<Cors>) -> Self {
        Self { cors, metrics: None }
    }

    /// Count decisions into `corsgate_cors_decisions_total`.
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsService {
            inner,
            cors: Arc::clone(&self.cors),
            metrics: self.metrics.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CorsService<S> {
    inner: S,
    cors: Arc<Cors>,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let (parts, body) = req.into_parts();
        let outcome = self.cors.evaluate(&parts);

        if let Some(m) = &self.metrics {
            m.cors_decisions.inc(&[("outcome", outcome.label())]);
        }
        tracing::debug!(
            method = %parts.method,
            path = %parts.uri.path(),
            origin = ?parts.headers.get(ORIGIN),
            outcome = outcome.label(),
            "cors evaluated"
        );

        match outcome {
            Outcome::Bypass => Box::pin(self.inner.call(Request::from_parts(parts, body))),
            Outcome::Preflight(headers) => {
                let mut res = Response::new(ResBody::default());
                *res.status_mut() = StatusCode::NO_CONTENT;
                headers.apply(res.headers_mut());
                Box::pin(async move { Ok(res) })
            }
            Outcome::Simple(headers) => {
                let fut = self.inner.call(Request::from_parts(parts, body));
                Box::pin(async move {
                    let mut res = fut.await?;
                    headers.apply_under(res.headers_mut());
                    Ok(res)
                })
            }
        }
    }
}
