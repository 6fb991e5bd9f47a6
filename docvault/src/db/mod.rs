//! Storage layer for the gateway
//!
//! In-memory stores behind trait seams: documents with their payloads, and
//! the principal directory backing the auth gate.

pub mod documents;
pub mod principals;

pub use documents::{DocumentRepository, StoredDocument};
pub use principals::{MemoryDirectory, Principal, PrincipalDirectory, PrincipalRecord};
