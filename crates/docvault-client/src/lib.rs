//! Rust client for the docvault gateway API
//!
//! # Example
//!
//! ```rust,no_run
//! use docvault_client::{ApiConfig, DocumentApi, NewDocument};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create client
//! let api = DocumentApi::new(ApiConfig {
//!     base_url: "http://localhost:8080".into(),
//!     bearer_token: Some("eyJhbGciOi...".into()),
//!     ..Default::default()
//! });
//!
//! // Upload a document
//! let doc = api
//!     .upload(&NewDocument {
//!         filename: "resume.pdf".into(),
//!         category: "Job Applications".into(),
//!         image: std::fs::read("resume.pdf")?,
//!         user: "Ada".into(),
//!     })
//!     .await?;
//!
//! // Fetch it back
//! let fetched = api.fetch_one(doc.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types
pub use client::DocumentApi;
pub use error::{ApiError, Result};
pub use types::*;
