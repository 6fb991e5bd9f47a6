//! Authentication for the gateway
//!
//! Provides:
//! - JWT token verification and issuance
//! - The request authentication gate in front of protected routes

pub mod gate;
pub mod token;

pub use gate::{AuthError, AuthGate};
pub use token::{extract_bearer, Claims, TokenVerifier};
