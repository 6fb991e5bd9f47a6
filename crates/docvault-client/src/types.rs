//! Types for the docvault gateway API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the docvault gateway HTTP API
    pub base_url: String,
    /// Optional bearer token for protected operations
    pub bearer_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            bearer_token: None,
            timeout_secs: 30,
        }
    }
}

/// A stored document as returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document ID assigned by the gateway
    pub id: u64,
    /// Display filename
    pub filename: String,
    /// Category label used for list filtering
    pub category: String,
    /// Reference to the stored payload (gateway-relative path)
    pub image: String,
    /// Name of the principal that uploaded the document
    pub owner: String,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

/// Input for uploading a new document
///
/// The payload travels base64-encoded inside the JSON body; callers hand over
/// raw bytes and the client does the encoding.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub category: String,
    /// Raw payload bytes
    pub image: Vec<u8>,
    /// Display name of the uploading user
    pub user: String,
}

/// Wire form of an upload request
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub filename: String,
    pub category: String,
    /// Base64-encoded payload
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Partial update for an existing document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Structured error body returned by the gateway
///
/// The gateway writes `{error, code}`; `{message}` is accepted as an
/// alternate key and wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// The application-level failure message, whichever key carried it
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
