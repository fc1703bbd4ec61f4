//! corsgate core: the transport-agnostic CORS policy evaluator and the shared
//! error type.
//!
//! The evaluator only speaks `http` types (`request::Parts`, `HeaderMap`,
//! `HeaderValue`) so it can sit behind any tower/axum stack, or be driven
//! directly from tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! (policy compilation) surfaces as `CorsGateError`; request evaluation itself
//! cannot fail.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cors;
pub mod error;

pub use cors::{Bypass, Cors, CorsHeaders, CorsOptions, Outcome};
/// Shared result type.
pub use error::{CorsGateError, ErrorKind, Result};
