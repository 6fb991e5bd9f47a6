//! HTTP server for the gateway

pub mod http;

pub use http::{run, serve, AppState};
