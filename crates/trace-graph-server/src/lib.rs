//! HTTP surface for the trace-graph service.
//!
//! The binary lives in `main.rs`; this library exposes the router and
//! state so integration tests can drive the API against in-memory stubs.

pub mod error;
pub mod http;

pub use http::{router, AppState};
