//! Error types for the docvault client
//!
//! Every failure is tagged by what the server did: `Status` and `Decode`
//! mean the server answered and the call can be treated as rejected;
//! `Transport` means no response arrived at all.

use thiserror::Error;

/// Client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, DNS)
    #[error("request failed: {detail}")]
    Transport { detail: String },

    /// The server answered with a non-success status
    #[error("server error {status}: {}", .message.as_deref().unwrap_or("request rejected"))]
    Status { status: u16, message: Option<String> },

    /// The server answered but the body could not be decoded
    #[error("unreadable response (status {status}): {detail}")]
    Decode { status: u16, detail: String },
}

impl ApiError {
    /// True when the server produced a response, even a failing one
    pub fn server_responded(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Decode { .. })
    }

    /// Application-level message extracted from the server's error body
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Status { message, .. } => message.clone(),
            _ => None,
        }
    }

    /// HTTP status of the response, when one arrived
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            detail: err.to_string(),
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
