//! HTTP routes for documents
//!
//! - `GET    /api/v1/documents`          - list, optional `?category=` filter (public)
//! - `GET    /api/v1/documents/{id}`     - fetch one (public)
//! - `GET    /api/v1/documents/{id}/raw` - stored payload bytes (public)
//! - `POST   /api/v1/documents`          - upload (bearer token)
//! - `PUT    /api/v1/documents/{id}`     - update metadata (bearer token)
//! - `DELETE /api/v1/documents/{id}`     - delete (bearer token)
//!
//! Mutating routes pass through the auth gate before their handler runs;
//! both gate failures answer 401 with a structured body.

use base64::Engine;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use docvault_client::{DocumentPatch, UploadRequest};

use crate::auth::AuthError;
use crate::server::AppState;
use crate::types::GatewayError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Upload bodies carry the whole payload base64-encoded
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Metadata patches are small
const MAX_PATCH_BYTES: usize = 10240;

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

// =============================================================================
// Response Helpers
// =============================================================================

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

pub fn error_response(status: StatusCode, message: &str, code: &str) -> Response<BoxBody> {
    json_response(
        status,
        &ErrorResponse {
            error: message.to_string(),
            code: Some(code.to_string()),
        },
    )
}

fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

async fn parse_json_body<T: for<'de> serde::Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
    max_bytes: usize,
) -> Result<T, GatewayError> {
    let body = req.collect().await?;

    let bytes = body.to_bytes();
    if bytes.len() > max_bytes {
        return Err(GatewayError::BadRequest("Request body too large".into()));
    }

    Ok(serde_json::from_slice(&bytes)?)
}

fn get_auth_header(req: &Request<hyper::body::Incoming>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

fn unauthorized(err: &AuthError) -> Response<BoxBody> {
    warn!("Request rejected at the gate: {}", err);
    error_response(StatusCode::UNAUTHORIZED, &err.to_string(), err.code())
}

fn document_not_found(id: u64) -> Response<BoxBody> {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("Document {} not found", id),
        "NOT_FOUND",
    )
}

/// Extract a non-empty `category` value from a query string
fn category_from_query(query: Option<&str>) -> Option<String> {
    let query = query?;

    for param in query.split('&') {
        if let Some((key, value)) = param.split_once('=') {
            if key == "category" && !value.is_empty() {
                // A value that fails to decode keeps its raw form; the
                // filter itself is never dropped
                return match urlencoding::decode(value) {
                    Ok(decoded) => Some(decoded.into_owned()),
                    Err(_) => Some(value.to_string()),
                };
            }
        }
    }

    None
}

// =============================================================================
// Route Table
// =============================================================================

/// Parsed document route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRoute {
    List,
    Get(u64),
    Raw(u64),
    Create,
    Update(u64),
    Delete(u64),
}

impl DocumentRoute {
    /// Parse method + path into a route. Returns None for paths outside
    /// `/api/v1/documents` and for malformed IDs.
    pub fn parse(method: &Method, path: &str) -> Option<Self> {
        let rest = path.strip_prefix("/api/v1/documents")?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        if rest.is_empty() {
            return match *method {
                Method::GET => Some(Self::List),
                Method::POST => Some(Self::Create),
                _ => None,
            };
        }

        let rest = rest.strip_prefix('/')?;

        if let Some(id_str) = rest.strip_suffix("/raw") {
            let id: u64 = id_str.parse().ok()?;
            return if *method == Method::GET {
                Some(Self::Raw(id))
            } else {
                None
            };
        }

        let id: u64 = rest.parse().ok()?;
        match *method {
            Method::GET => Some(Self::Get(id)),
            Method::PUT => Some(Self::Update(id)),
            Method::DELETE => Some(Self::Delete(id)),
            _ => None,
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /api/v1/documents
fn handle_list(state: &AppState, query: Option<&str>) -> Response<BoxBody> {
    let category = category_from_query(query);
    let docs = state.documents.list(category.as_deref());
    json_response(StatusCode::OK, &docs)
}

/// GET /api/v1/documents/{id}
fn handle_get(state: &AppState, id: u64) -> Response<BoxBody> {
    match state.documents.get(id) {
        Some(doc) => json_response(StatusCode::OK, &doc),
        None => document_not_found(id),
    }
}

/// GET /api/v1/documents/{id}/raw
fn handle_raw(state: &AppState, id: u64) -> Response<BoxBody> {
    match state.documents.payload(id) {
        Some(payload) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/octet-stream")
            .header("Access-Control-Allow-Origin", "*")
            .body(full_body(payload))
            .unwrap(),
        None => document_not_found(id),
    }
}

/// POST /api/v1/documents
///
/// Flow:
/// 1. Authenticate through the gate
/// 2. Parse and validate the upload body
/// 3. Decode the base64 payload
/// 4. Store and answer 201 with the created document
async fn handle_upload(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req).map(str::to_string);
    let principal = match state.gate.authenticate(auth_header.as_deref()).await {
        Ok(p) => p,
        Err(e) => return unauthorized(&e),
    };

    let body: UploadRequest = match parse_json_body(req, MAX_UPLOAD_BYTES).await {
        Ok(b) => b,
        Err(e) => return error_response(e.status_code(), &e.to_string(), "BAD_BODY"),
    };

    if body.filename.is_empty() || body.category.is_empty() || body.image.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: filename, category, image",
            "MISSING_FIELDS",
        );
    }

    let payload = match base64::engine::general_purpose::STANDARD.decode(&body.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid base64 payload: {}", e),
                "BAD_PAYLOAD",
            )
        }
    };

    let doc = state
        .documents
        .insert(&body.filename, &body.category, payload, &principal.name);

    info!("Document {} uploaded by {}", doc.id, principal.id);
    json_response(StatusCode::CREATED, &doc)
}

/// PUT /api/v1/documents/{id}
async fn handle_update(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: u64,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req).map(str::to_string);
    let principal = match state.gate.authenticate(auth_header.as_deref()).await {
        Ok(p) => p,
        Err(e) => return unauthorized(&e),
    };

    let patch: DocumentPatch = match parse_json_body(req, MAX_PATCH_BYTES).await {
        Ok(b) => b,
        Err(e) => return error_response(e.status_code(), &e.to_string(), "BAD_BODY"),
    };

    match state.documents.update(id, &patch) {
        Some(doc) => {
            info!("Document {} updated by {}", id, principal.id);
            json_response(StatusCode::OK, &doc)
        }
        None => document_not_found(id),
    }
}

/// DELETE /api/v1/documents/{id}
async fn handle_delete(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: u64,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req).map(str::to_string);
    let principal = match state.gate.authenticate(auth_header.as_deref()).await {
        Ok(p) => p,
        Err(e) => return unauthorized(&e),
    };

    match state.documents.remove(id) {
        Some(doc) => {
            info!("Document {} deleted by {}", id, principal.id);
            json_response(StatusCode::OK, &doc)
        }
        None => document_not_found(id),
    }
}

// =============================================================================
// Main Router
// =============================================================================

/// Handle document HTTP requests.
///
/// Returns Some(response) if the request was handled, None if it is not a
/// document route.
pub async fn handle_document_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();

    if !path.starts_with("/api/v1/documents") {
        return None;
    }

    if req.method() == Method::OPTIONS {
        return Some(cors_preflight());
    }

    let route = match DocumentRoute::parse(req.method(), &path) {
        Some(route) => route,
        None => {
            return Some(error_response(
                StatusCode::NOT_FOUND,
                &format!("No such document route: {} {}", req.method(), path),
                "NOT_FOUND",
            ))
        }
    };

    let response = match route {
        DocumentRoute::List => handle_list(&state, req.uri().query()),
        DocumentRoute::Get(id) => handle_get(&state, id),
        DocumentRoute::Raw(id) => handle_raw(&state, id),
        DocumentRoute::Create => handle_upload(req, state).await,
        DocumentRoute::Update(id) => handle_update(req, state, id).await,
        DocumentRoute::Delete(id) => handle_delete(req, state, id).await,
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route() {
        assert_eq!(
            DocumentRoute::parse(&Method::GET, "/api/v1/documents"),
            Some(DocumentRoute::List)
        );
        assert_eq!(
            DocumentRoute::parse(&Method::POST, "/api/v1/documents"),
            Some(DocumentRoute::Create)
        );
        assert_eq!(
            DocumentRoute::parse(&Method::GET, "/api/v1/documents/42"),
            Some(DocumentRoute::Get(42))
        );
        assert_eq!(
            DocumentRoute::parse(&Method::GET, "/api/v1/documents/42/raw"),
            Some(DocumentRoute::Raw(42))
        );
        assert_eq!(
            DocumentRoute::parse(&Method::PUT, "/api/v1/documents/7"),
            Some(DocumentRoute::Update(7))
        );
        assert_eq!(
            DocumentRoute::parse(&Method::DELETE, "/api/v1/documents/7"),
            Some(DocumentRoute::Delete(7))
        );
        // Trailing slash tolerated
        assert_eq!(
            DocumentRoute::parse(&Method::GET, "/api/v1/documents/"),
            Some(DocumentRoute::List)
        );
    }

    #[test]
    fn test_parse_route_invalid() {
        assert!(DocumentRoute::parse(&Method::GET, "/api/v1/other").is_none());
        assert!(DocumentRoute::parse(&Method::GET, "/api/v1/documents/abc").is_none());
        assert!(DocumentRoute::parse(&Method::PATCH, "/api/v1/documents/1").is_none());
        assert!(DocumentRoute::parse(&Method::POST, "/api/v1/documents/1").is_none());
        assert!(DocumentRoute::parse(&Method::PUT, "/api/v1/documents/1/raw").is_none());
    }

    #[test]
    fn test_category_from_query() {
        assert_eq!(
            category_from_query(Some("category=Taxes")),
            Some("Taxes".into())
        );
        assert_eq!(
            category_from_query(Some("foo=bar&category=Job%20Apps")),
            Some("Job Apps".into())
        );
        // Empty value means no filter
        assert_eq!(category_from_query(Some("category=")), None);
        assert_eq!(category_from_query(Some("foo=bar")), None);
        assert_eq!(category_from_query(None), None);
        // Undecodable values keep their raw form instead of dropping the
        // filter, so a malformed escape can only narrow the listing
        assert_eq!(
            category_from_query(Some("category=%FF")),
            Some("%FF".into())
        );
        assert_eq!(
            category_from_query(Some("category=%ZZ")),
            Some("%ZZ".into())
        );
    }

    #[test]
    fn test_error_response_shape() {
        let resp = error_response(StatusCode::NOT_FOUND, "Document 9 not found", "NOT_FOUND");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
