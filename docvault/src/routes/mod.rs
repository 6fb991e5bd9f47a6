//! HTTP routes for the gateway

pub mod documents;
pub mod health;

pub use documents::{error_response, handle_document_request, DocumentRoute};
pub use health::health_check;
