//! Request authentication gate
//!
//! Sits between the router and every protected handler: extract the bearer
//! token, verify it, resolve the principal with its credential secret
//! stripped. Fails closed and exposes only two failure kinds; a caller
//! probing with made-up tokens cannot tell signature failures, expiry, and
//! unknown principals apart.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::token::{extract_bearer, TokenVerifier};
use crate::db::{Principal, PrincipalDirectory};

/// Externally visible authentication failures
///
/// Everything that goes wrong after a well-formed header arrives collapses
/// into `InvalidOrExpired`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization: Bearer <token>` header on the request
    #[error("No token attached to headers or it has expired")]
    MissingBearer,

    /// The token failed verification or resolved to no known principal
    #[error("No token or it has expired")]
    InvalidOrExpired,
}

impl AuthError {
    /// Stable machine-readable code for error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingBearer => "NO_TOKEN",
            Self::InvalidOrExpired => "TOKEN_INVALID",
        }
    }
}

/// The gate itself: verifier + principal directory
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
    principals: Arc<dyn PrincipalDirectory>,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier, principals: Arc<dyn PrincipalDirectory>) -> Self {
        Self {
            verifier,
            principals,
        }
    }

    /// Authenticate one request from its Authorization header
    ///
    /// One verification attempt, no retries. The directory lookup happens
    /// after verification and may suspend; no locks are held across it.
    pub async fn authenticate(&self, auth_header: Option<&str>) -> Result<Principal, AuthError> {
        let token = extract_bearer(auth_header).ok_or(AuthError::MissingBearer)?;

        let claims = self.verifier.verify(token).map_err(|e| {
            debug!("Token verification failed: {}", e);
            AuthError::InvalidOrExpired
        })?;

        match self.principals.find_by_id(&claims.sub).await {
            Some(principal) => Ok(principal),
            None => {
                // Known-good signature but no such principal; collapsed so
                // the response does not confirm which IDs exist
                warn!("Token subject {} not found in directory", claims.sub);
                Err(AuthError::InvalidOrExpired)
            }
        }
    }
}
