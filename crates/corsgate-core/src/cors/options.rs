//! CORS options and the bypass predicate.
//!
//! `CorsOptions` is plain data: every field has a documented default and an
//! empty list falls back to that default when the policy is compiled.

use std::fmt;
use std::sync::Arc;

use http::request::Parts;

/// Origin entry matching any origin.
pub const WILDCARD: &str = "*";

/// Methods allowed when `allow_methods` is left empty.
pub const DEFAULT_ALLOW_METHODS: [&str; 6] = ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"];

type BypassFn = dyn Fn(&Parts) -> bool + Send + Sync;

/// Predicate deciding whether a request skips CORS processing entirely.
#[derive(Clone, Default)]
pub struct Bypass(Option<Arc<BypassFn>>);

impl Bypass {
    /// Never bypass (default).
    pub fn never() -> Self {
        Self(None)
    }

    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Parts) -> bool + Send + Sync + 'static,
    {
        Self(Some(Arc::new(f)))
    }

    /// Bypass requests whose path is one of `prefixes` or lies below it.
    /// Matching stops at segment boundaries: `/healthz` covers `/healthz` and
    /// `/healthz/live`, not `/healthzz`. A trailing `/` on a prefix is ignored.
    /// Empty or bare `/` prefixes are ignored; an empty list never bypasses.
    pub fn path_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(Into::into)
            .map(|p: String| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if prefixes.is_empty() {
            return Self::never();
        }
        Self::new(move |parts| {
            let path = parts.uri.path();
            prefixes.iter().any(|p| under_prefix(path, p))
        })
    }

    pub fn applies(&self, parts: &Parts) -> bool {
        match &self.0 {
            Some(f) => f(parts),
            None => false,
        }
    }

    pub fn is_never(&self) -> bool {
        self.0.is_none()
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl fmt::Debug for Bypass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Bypass(fn)"),
            None => f.write_str("Bypass(never)"),
        }
    }
}

/// Raw CORS configuration, compiled once by [`crate::Cors::new`].
#[derive(Debug, Clone)]
pub struct CorsOptions {
    /// Origins that may access the resource. `"*"` matches any origin.
    /// Default `["*"]`.
    pub allow_origins: Vec<String>,
    /// Methods answered on preflight. Default [`DEFAULT_ALLOW_METHODS`].
    pub allow_methods: Vec<String>,
    /// Request headers allowed on the actual request. Default empty, which
    /// echoes `Access-Control-Request-Headers` back on preflight.
    pub allow_headers: Vec<String>,
    /// Emit `Access-Control-Allow-Credentials: true`. Also makes a `"*"`
    /// origin entry reflect the request origin instead of the literal `"*"`.
    pub allow_credentials: bool,
    /// Response headers exposed to the client on simple requests. Default empty.
    pub expose_headers: Vec<String>,
    /// Preflight cache lifetime in seconds. `0` omits `Access-Control-Max-Age`.
    pub max_age: u32,
    /// Skip predicate. Default never.
    pub bypass: Bypass,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            allow_origins: vec![WILDCARD.to_string()],
            allow_methods: default_allow_methods(),
            allow_headers: Vec::new(),
            allow_credentials: false,
            expose_headers: Vec::new(),
            max_age: 0,
            bypass: Bypass::never(),
        }
    }
}

impl CorsOptions {
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_age(mut self, secs: u32) -> Self {
        self.max_age = secs;
        self
    }

    pub fn bypass(mut self, bypass: Bypass) -> Self {
        self.bypass = bypass;
        self
    }
}

pub(crate) fn default_allow_methods() -> Vec<String> {
    DEFAULT_ALLOW_METHODS.iter().map(|m| m.to_string()).collect()
}
