//! HTTP client for the docvault gateway API

use crate::error::{ApiError, Result};
use crate::types::*;
use base64::Engine;
use reqwest::{header, Client};
use std::time::Duration;

/// HTTP client for the docvault gateway API
///
/// # Example
///
/// ```rust,no_run
/// use docvault_client::{ApiConfig, DocumentApi};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = DocumentApi::new(ApiConfig {
///     base_url: "http://localhost:8080".into(),
///     bearer_token: Some("eyJhbGciOi...".into()),
///     ..Default::default()
/// });
///
/// // List documents
/// let docs = api.fetch_all(None).await?;
///
/// // Fetch one
/// let doc = api.fetch_one(1).await?;
/// # Ok(())
/// # }
/// ```
pub struct DocumentApi {
    config: ApiConfig,
    client: Client,
}

impl DocumentApi {
    /// Create a new client
    pub fn new(config: ApiConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = config.bearer_token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .expect("Invalid bearer token"),
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { config, client }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // ==================== Document API ====================

    /// Upload a new document
    ///
    /// The payload is base64-encoded into the JSON body. Requires a bearer
    /// token.
    pub async fn upload(&self, input: &NewDocument) -> Result<Document> {
        let url = format!("{}/api/v1/documents", self.config.base_url);

        let body = UploadRequest {
            filename: input.filename.clone(),
            category: input.category.clone(),
            image: base64::engine::general_purpose::STANDARD.encode(&input.image),
            user: Some(input.user.clone()),
        };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Update an existing document's metadata. Requires a bearer token.
    pub async fn update(&self, id: u64, patch: &DocumentPatch) -> Result<Document> {
        let url = format!("{}/api/v1/documents/{}", self.config.base_url, id);

        let response = self
            .client
            .put(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(patch)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a document, returning its last stored form. Requires a bearer
    /// token.
    pub async fn delete(&self, id: u64) -> Result<Document> {
        let url = format!("{}/api/v1/documents/{}", self.config.base_url, id);

        let response = self.client.delete(&url).send().await?;
        self.handle_response(response).await
    }

    /// List documents, optionally filtered by category
    pub async fn fetch_all(&self, category: Option<&str>) -> Result<Vec<Document>> {
        let mut url = format!("{}/api/v1/documents", self.config.base_url);
        if let Some(category) = category {
            url.push_str("?category=");
            url.push_str(&urlencoding::encode(category));
        }

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch a single document by ID
    pub async fn fetch_one(&self, id: u64) -> Result<Document> {
        let url = format!("{}/api/v1/documents/{}", self.config.base_url, id);

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch the raw payload bytes of a document
    pub async fn fetch_payload(&self, id: u64) -> Result<Vec<u8>> {
        let url = format!("{}/api/v1/documents/{}/raw", self.config.base_url, id);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode {
                status: status.as_u16(),
                detail: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }

    // ==================== Helper Methods ====================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        response.json().await.map_err(|e| ApiError::Decode {
            status: status.as_u16(),
            detail: e.to_string(),
        })
    }
}

/// Pull the application message out of a structured error body, if there is
/// one. A body that is not JSON yields no message.
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
}
