//! CORS policy evaluator.
//!
//! Compiles [`CorsOptions`] into an immutable [`Cors`] policy, then maps each
//! request head to an [`Outcome`]: bypass, simple (annotate the downstream
//! response) or preflight (answer `204` directly).

pub mod engine;
pub mod headers;
pub mod options;

pub use engine::{Cors, Outcome};
pub use headers::CorsHeaders;
pub use options::{Bypass, CorsOptions, DEFAULT_ALLOW_METHODS, WILDCARD};
