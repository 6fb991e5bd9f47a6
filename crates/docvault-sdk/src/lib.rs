//! Docvault SDK - client-side operation lifecycle for the docvault gateway
//!
//! # Architecture
//!
//! Two pieces work together:
//!
//! - [`DocumentActions`]: dispatches the five document operations over a
//!   [`DocumentTransport`] and settles each one through a shared
//!   pending/fulfilled/rejected lifecycle.
//! - [`ResourceStore`]: a single snapshot of all operation records plus the
//!   created/updated/deleted navigation signals, replaced atomically on every
//!   event and observable through a watch subscription.
//!
//! A server-side rejection is absorbed into the store with both its error
//! channels; a transport failure with no response is re-raised to the caller
//! and leaves the snapshot as it was.
//!
//! # Example
//!
//! ```rust,no_run
//! use docvault_client::{ApiConfig, DocumentApi};
//! use docvault_sdk::{DocumentActions, SideEffect};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = DocumentApi::new(ApiConfig {
//!     base_url: "http://localhost:8080".into(),
//!     bearer_token: Some("eyJhbGciOi...".into()),
//!     ..Default::default()
//! });
//! let actions = DocumentActions::new(api);
//!
//! let outcome = actions.fetch_all(None).await?;
//! println!("fetched: {}", outcome.is_fulfilled());
//!
//! // React to navigation signals, then lower them
//! if actions.store().snapshot().created {
//!     actions.store().consume(SideEffect::Created);
//! }
//! # Ok(())
//! # }
//! ```

// Operation dispatch over a transport
pub mod dispatch;

// Snapshot store and reducer
pub mod store;

// Re-export dispatcher types
pub use dispatch::{DispatchOutcome, DocumentActions, DocumentTransport};

// Re-export store types
pub use store::{
    OperationKind, OperationOutput, OperationRecord, OperationStatus, ResourceStore, SideEffect,
    StoreEvent, StoreSnapshot,
};

// Re-export from the transport crate
pub use docvault_client::{ApiConfig, ApiError, Document, DocumentApi, DocumentPatch, NewDocument};
