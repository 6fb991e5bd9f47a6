//! Docvault - bearer-token gateway for stored documents
//!
//! Every mutating document route sits behind a JWT bearer-token gate that
//! resolves tokens to secret-stripped principals and fails closed. Fetch
//! routes are public. Storage is in-memory behind trait seams.

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{GatewayError, Result};
