use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN,
};
use http::request::Parts;
use http::{HeaderName, HeaderValue, Method};

use crate::error::{CorsGateError, Result};

use super::headers::CorsHeaders;
use super::options::{default_allow_methods, Bypass, CorsOptions, WILDCARD};

/// Result of evaluating one request against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Skip CORS; forward the request untouched.
    Bypass,
    /// Forward the request, then apply these headers to the response.
    Simple(CorsHeaders),
    /// Answer `204 No Content` with these headers; do not forward.
    Preflight(CorsHeaders),
}

impl Outcome {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Bypass => "bypass",
            Outcome::Simple(_) => "simple",
            Outcome::Preflight(_) => "preflight",
        }
    }
}

#[derive(Debug, Clone)]
enum OriginRule {
    Any,
    Exact(HeaderValue),
}

/// Compiled CORS policy.
/// Construct once at startup, then share via Arc.
#[derive(Debug, Clone)]
pub struct Cors {
    origins: Vec<OriginRule>,
    allow_methods: HeaderValue,
    allow_headers: Option<HeaderValue>,
    expose_headers: Option<HeaderValue>,
    allow_credentials: bool,
    max_age: Option<HeaderValue>,
    bypass: Bypass,
}

impl Cors {
    pub fn new(options: CorsOptions) -> Result<Self> {
        let CorsOptions {
            mut allow_origins,
            mut allow_methods,
            allow_headers,
            allow_credentials,
            expose_headers,
            max_age,
            bypass,
        } = options;

        if allow_origins.is_empty() {
            allow_origins.push(WILDCARD.to_string());
        }
        if allow_methods.is_empty() {
            allow_methods = default_allow_methods();
        }

        let origins = allow_origins
            .iter()
            .map(|o| compile_origin(o))
            .collect::<Result<Vec<_>>>()?;

        for m in &allow_methods {
            Method::from_bytes(m.as_bytes())
                .map_err(|_| CorsGateError::InvalidMethod(m.clone()))?;
        }
        for h in allow_headers.iter().chain(expose_headers.iter()) {
            HeaderName::from_bytes(h.as_bytes())
                .map_err(|_| CorsGateError::InvalidHeaderName(h.clone()))?;
        }

        let methods_value = join("allow_methods", &allow_methods)?.ok_or_else(|| {
            CorsGateError::Internal("allow_methods resolved to an empty list".into())
        })?;
        let headers_value = join("allow_headers", &allow_headers)?;
        let expose_value = join("expose_headers", &expose_headers)?;
        let max_age_value = (max_age > 0).then(|| HeaderValue::from(max_age));

        tracing::debug!(
            origins = ?allow_origins,
            methods = ?methods_value,
            allow_headers = ?headers_value,
            expose_headers = ?expose_value,
            credentials = allow_credentials,
            max_age,
            bypass = ?bypass,
            "cors policy compiled"
        );

        Ok(Self {
            origins,
            allow_methods: methods_value,
            allow_headers: headers_value,
            expose_headers: expose_value,
            allow_credentials,
            max_age: max_age_value,
            bypass,
        })
    }

    /// True when a `"*"` entry reflects the request origin back, i.e. any
    /// origin is granted credentialed access.
    pub fn reflects_any_origin(&self) -> bool {
        self.allow_credentials && self.origins.iter().any(|o| matches!(o, OriginRule::Any))
    }

    /// Decide what to do with a request. Never fails and never blocks.
    pub fn evaluate(&self, req: &Parts) -> Outcome {
        if self.bypass.applies(req) {
            return Outcome::Bypass;
        }

        let allow_origin = self.resolve_origin(req.headers.get(ORIGIN));
        let mut out = CorsHeaders::default();

        if req.method != Method::OPTIONS {
            out.vary("Origin");
            out.set(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
            if self.allow_credentials {
                out.set(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
            }
            if let Some(v) = &self.expose_headers {
                out.set(ACCESS_CONTROL_EXPOSE_HEADERS, v.clone());
            }
            return Outcome::Simple(out);
        }

        out.vary("Origin");
        out.vary("Access-Control-Request-Method");
        out.vary("Access-Control-Request-Headers");
        out.set(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        out.set(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        if self.allow_credentials {
            out.set(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        match &self.allow_headers {
            Some(v) => out.set(ACCESS_CONTROL_ALLOW_HEADERS, v.clone()),
            None => {
                if let Some(requested) = req
                    .headers
                    .get(ACCESS_CONTROL_REQUEST_HEADERS)
                    .filter(|v| !v.is_empty())
                {
                    out.set(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
                }
            }
        }
        if let Some(v) = &self.max_age {
            out.set(ACCESS_CONTROL_MAX_AGE, v.clone());
        }
        Outcome::Preflight(out)
    }

    /// First matching entry wins; no match yields an empty value.
    fn resolve_origin(&self, origin: Option<&HeaderValue>) -> HeaderValue {
        let request_origin = origin
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));

        for rule in &self.origins {
            match rule {
                OriginRule::Any if self.allow_credentials => return request_origin,
                OriginRule::Any => return HeaderValue::from_static(WILDCARD),
                OriginRule::Exact(v) if *v == request_origin => return v.clone(),
                OriginRule::Exact(_) => {}
            }
        }
        HeaderValue::from_static("")
    }
}

fn compile_origin(raw: &str) -> Result<OriginRule> {
    if raw == WILDCARD {
        return Ok(OriginRule::Any);
    }
    HeaderValue::from_str(raw)
        .map(OriginRule::Exact)
        .map_err(|_| CorsGateError::InvalidHeaderValue {
            field: "allow_origins",
            value: raw.to_string(),
        })
}

/// Comma-join (no spaces). `None` for an empty list.
fn join(field: &'static str, items: &[String]) -> Result<Option<HeaderValue>> {
    if items.is_empty() {
        return Ok(None);
    }
    let joined = items.join(",");
    HeaderValue::from_str(&joined)
        .map(Some)
        .map_err(|_| CorsGateError::InvalidHeaderValue {
            field,
            value: joined,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use http::Request;

    fn get(origin: Option<&str>) -> Parts {
        let mut b = Request::get("/");
        if let Some(o) = origin {
            b = b.header(ORIGIN, o);
        }
        b.body(()).unwrap().into_parts().0
    }

    fn simple(cors: &Cors, req: &Parts) -> CorsHeaders {
        match cors.evaluate(req) {
            Outcome::Simple(h) => h,
            other => panic!("expected simple outcome, got {other:?}"),
        }
    }

    #[test]
    fn empty_lists_fall_back_to_defaults() {
        let opts = CorsOptions {
            allow_origins: vec![],
            allow_methods: vec![],
            ..CorsOptions::default()
        };
        let cors = Cors::new(opts).unwrap();
        assert!(matches!(cors.origins.as_slice(), [OriginRule::Any]));
        assert_eq!(cors.allow_methods, "GET,HEAD,PUT,PATCH,POST,DELETE");
        assert!(cors.allow_headers.is_none());
        assert!(cors.expose_headers.is_none());
        assert!(cors.max_age.is_none());
    }

    #[test]
    fn lists_are_joined_once_without_spaces() {
        let cors = Cors::new(
            CorsOptions::default()
                .allow_methods(["GET", "POST"])
                .allow_headers(["X-One", "X-Two"])
                .expose_headers(["X-Total"])
                .max_age(600),
        )
        .unwrap();
        assert_eq!(cors.allow_methods, "GET,POST");
        assert_eq!(cors.allow_headers.as_ref().unwrap(), "X-One,X-Two");
        assert_eq!(cors.expose_headers.as_ref().unwrap(), "X-Total");
        assert_eq!(cors.max_age.as_ref().unwrap(), "600");
    }

    #[test]
    fn rejects_tokens_that_are_not_headers() {
        let err = Cors::new(CorsOptions::default().allow_methods(["GE T"])).unwrap_err();
        assert!(matches!(err, CorsGateError::InvalidMethod(ref m) if m == "GE T"));
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);

        let err = Cors::new(CorsOptions::default().allow_headers(["bad\nname"])).unwrap_err();
        assert!(matches!(err, CorsGateError::InvalidHeaderName(_)));

        let err = Cors::new(CorsOptions::default().allow_origins(["bad\norigin"])).unwrap_err();
        assert!(matches!(
            err,
            CorsGateError::InvalidHeaderValue { field: "allow_origins", .. }
        ));
    }

    #[test]
    fn first_matching_origin_wins() {
        let cors =
            Cors::new(CorsOptions::default().allow_origins(["https://a.test", "*"])).unwrap();
        let a = HeaderValue::from_static("https://a.test");
        let b = HeaderValue::from_static("https://b.test");
        assert_eq!(cors.resolve_origin(Some(&a)), "https://a.test");
        assert_eq!(cors.resolve_origin(Some(&b)), "*");
    }

    #[test]
    fn origin_match_is_exact_and_case_sensitive() {
        let cors = Cors::new(CorsOptions::default().allow_origins(["https://a.test"])).unwrap();
        assert_eq!(cors.resolve_origin(Some(&HeaderValue::from_static("https://A.test"))), "");
        assert_eq!(cors.resolve_origin(Some(&HeaderValue::from_static("https://sub.a.test"))), "");
        assert_eq!(cors.resolve_origin(None), "");
    }

    #[test]
    fn wildcard_with_credentials_reflects_even_missing_origin() {
        let cors = Cors::new(CorsOptions::default().allow_credentials(true)).unwrap();
        assert_eq!(cors.resolve_origin(None), "");
        assert_eq!(cors.resolve_origin(Some(&HeaderValue::from_static("localhost"))), "localhost");
    }

    #[test]
    fn reflects_any_origin_needs_wildcard_and_credentials() {
        let on = |o: CorsOptions| Cors::new(o).unwrap().reflects_any_origin();
        assert!(on(CorsOptions::default().allow_credentials(true)));
        let no_origins = CorsOptions::default().allow_origins(Vec::<String>::new());
        assert!(on(no_origins.allow_credentials(true)));
        assert!(!on(CorsOptions::default()));
        let listed = CorsOptions::default().allow_origins(["https://a.test"]);
        assert!(!on(listed.allow_credentials(true)));
    }

    #[test]
    fn unmatched_origin_still_emits_headers() {
        let cors = Cors::new(CorsOptions::default().allow_origins(["https://a.test"])).unwrap();
        let h = simple(&cors, &get(Some("https://evil.test")));
        assert_eq!(h.get(&ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "");
        assert_eq!(h.vary_values(), &[HeaderValue::from_static("Origin")]);
    }

    #[test]
    fn simple_request_carries_expose_but_not_preflight_headers() {
        let cors = Cors::new(
            CorsOptions::default()
                .expose_headers(["X-Total"])
                .allow_headers(["X-In"])
                .max_age(10),
        )
        .unwrap();
        let h = simple(&cors, &get(None));
        assert_eq!(h.get(&ACCESS_CONTROL_EXPOSE_HEADERS).unwrap(), "X-Total");
        assert!(h.get(&ACCESS_CONTROL_ALLOW_METHODS).is_none());
        assert!(h.get(&ACCESS_CONTROL_ALLOW_HEADERS).is_none());
        assert!(h.get(&ACCESS_CONTROL_MAX_AGE).is_none());
        assert!(h.get(&ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Bypass.label(), "bypass");
        assert_eq!(Outcome::Simple(CorsHeaders::default()).label(), "simple");
        assert_eq!(Outcome::Preflight(CorsHeaders::default()).label(), "preflight");
    }
}
