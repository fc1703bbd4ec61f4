//! corsgate gateway library entry.
//!
//! Wires the CORS evaluator from `corsgate-core` into an axum/tower stack:
//! strict YAML config, shared state, the CORS middleware, ops endpoints and
//! metrics. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod router;
