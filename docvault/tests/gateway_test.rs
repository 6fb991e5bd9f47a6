//! End-to-end gateway tests
//!
//! Boots the real HTTP server on an ephemeral port and drives it through the
//! client and SDK crates: gate behavior at the edge, document CRUD, and the
//! client-side operation lifecycle against live responses.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, EncodingKey, Header};
use tokio_test::assert_ok;
use uuid::Uuid;

use docvault::auth::{AuthGate, Claims, TokenVerifier};
use docvault::config::Args;
use docvault::db::{DocumentRepository, MemoryDirectory, PrincipalRecord};
use docvault::server::{self, AppState};

use docvault_client::{ApiConfig, ApiError, DocumentApi, DocumentPatch, NewDocument};
use docvault_sdk::{
    DispatchOutcome, DocumentActions, OperationKind, OperationOutput, OperationStatus, SideEffect,
    StoreEvent,
};

const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

// =============================================================================
// Harness
// =============================================================================

/// Boot a gateway on 127.0.0.1:0 with one known principal; returns the bound
/// address and a valid token for that principal.
async fn spawn_gateway() -> (SocketAddr, String) {
    let verifier = TokenVerifier::new(TEST_SECRET.into(), 3600).unwrap();

    let directory = Arc::new(MemoryDirectory::new());
    directory.insert(PrincipalRecord {
        id: "u-1".into(),
        name: "Integration Tester".into(),
        email: "tester@example.com".into(),
        password_hash: "$argon2id$stub".into(),
    });
    let token = verifier.issue("u-1").unwrap();

    let args = Args {
        node_id: Uuid::new_v4(),
        listen: "127.0.0.1:0".parse().unwrap(),
        dev_mode: false,
        jwt_secret: Some(TEST_SECRET.into()),
        jwt_expiry_seconds: 3600,
        log_level: "info".into(),
    };

    let gate = AuthGate::new(verifier, directory);
    let state = Arc::new(AppState::new(
        args,
        gate,
        Arc::new(DocumentRepository::new()),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));

    (addr, token)
}

fn api(addr: SocketAddr, token: Option<&str>) -> DocumentApi {
    DocumentApi::new(ApiConfig {
        base_url: format!("http://{}", addr),
        bearer_token: token.map(str::to_string),
        timeout_secs: 5,
    })
}

fn expired_token(sub: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = Claims {
        sub: sub.into(),
        iat: now - 7200,
        exp: now - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn post_documents(
    addr: SocketAddr,
    auth_header: Option<&str>,
) -> (reqwest::StatusCode, serde_json::Value) {
    let client = reqwest::Client::new();
    let mut request = client
        .post(format!("http://{}/api/v1/documents", addr))
        .json(&serde_json::json!({
            "filename": "x.pdf",
            "category": "Misc",
            "image": "aGVsbG8="
        }));
    if let Some(value) = auth_header {
        request = request.header(reqwest::header::AUTHORIZATION, value);
    }

    let response = request.send().await.unwrap();
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap();
    (status, body)
}

// =============================================================================
// Health and routing
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, _token) = spawn_gateway().await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["healthy"], true);
    assert_eq!(body["mode"], "production");
}

#[tokio::test]
async fn test_unknown_route_answers_404() {
    let (addr, _token) = spawn_gateway().await;

    let response = reqwest::get(format!("http://{}/api/v1/nothing", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (addr, _token) = spawn_gateway().await;

    let client = reqwest::Client::new();
    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("http://{}/api/v1/documents", addr),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    let methods = response
        .headers()
        .get("Access-Control-Allow-Methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("DELETE"));
}

// =============================================================================
// Gate behavior at the edge
// =============================================================================

#[tokio::test]
async fn test_missing_token_rejected_with_code() {
    let (addr, _token) = spawn_gateway().await;

    let (status, body) = post_documents(addr, None).await;
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NO_TOKEN");
}

#[tokio::test]
async fn test_empty_bearer_rejected_like_missing() {
    let (addr, _token) = spawn_gateway().await;

    let (status, body) = post_documents(addr, Some("Bearer ")).await;
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NO_TOKEN");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let (addr, _token) = spawn_gateway().await;

    let (status, body) = post_documents(addr, Some("Bearer not-a-jwt")).await;
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let (addr, _token) = spawn_gateway().await;

    let header = format!("Bearer {}", expired_token("u-1"));
    let (status, body) = post_documents(addr, Some(&header)).await;
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_unknown_principal_indistinguishable_from_bad_token() {
    let (addr, _token) = spawn_gateway().await;

    // Correctly signed token for a principal that does not exist
    let verifier = TokenVerifier::new(TEST_SECRET.into(), 3600).unwrap();
    let ghost = format!("Bearer {}", verifier.issue("ghost").unwrap());

    let (ghost_status, ghost_body) = post_documents(addr, Some(&ghost)).await;
    let (bad_status, bad_body) = post_documents(addr, Some("Bearer not-a-jwt")).await;

    // Same status, same code, same message: no identity enumeration
    assert_eq!(ghost_status, bad_status);
    assert_eq!(ghost_body["code"], bad_body["code"]);
    assert_eq!(ghost_body["error"], bad_body["error"]);
}

#[tokio::test]
async fn test_fetch_routes_are_public() {
    let (addr, _token) = spawn_gateway().await;

    let response = reqwest::get(format!("http://{}/api/v1/documents", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let docs: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_malformed_json_body_answers_bad_request() {
    let (addr, token) = spawn_gateway().await;

    // Authorized request whose body is not JSON at all
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/v1/documents", addr))
        .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("this is not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "BAD_BODY");
    assert!(body["error"].as_str().unwrap().contains("JSON error"));
}

// =============================================================================
// Document lifecycle through the SDK
// =============================================================================

#[tokio::test]
async fn test_document_lifecycle() {
    let (addr, token) = spawn_gateway().await;
    let actions = DocumentActions::new(api(addr, Some(&token)));

    // Upload
    let outcome = tokio_test::assert_ok!(
        actions
            .upload(&NewDocument {
                filename: "resume.pdf".into(),
                category: "Job Applications".into(),
                image: b"%PDF-1.4 stub".to_vec(),
                user: "Integration Tester".into(),
            })
            .await
    );
    let doc = outcome.fulfilled().unwrap();
    assert_eq!(doc.owner, "Integration Tester");

    let snapshot = actions.store().snapshot();
    assert_eq!(snapshot.upload.status, OperationStatus::Fulfilled);
    assert!(snapshot.created);
    assert!(!snapshot.updated && !snapshot.deleted);

    // Observer consumes the created signal; records stay put
    actions.store().consume(SideEffect::Created);
    let snapshot = actions.store().snapshot();
    assert!(!snapshot.created);
    assert_eq!(snapshot.upload.status, OperationStatus::Fulfilled);

    // The stored payload round-trips
    let payload = api(addr, None).fetch_payload(doc.id).await.unwrap();
    assert_eq!(payload, b"%PDF-1.4 stub");

    // List with and without filter
    let all = actions.fetch_all(None).await.unwrap().fulfilled().unwrap();
    assert_eq!(all.len(), 1);
    let filtered = actions
        .fetch_all(Some("Job Applications"))
        .await
        .unwrap()
        .fulfilled()
        .unwrap();
    assert_eq!(filtered.len(), 1);
    let none = actions
        .fetch_all(Some("Receipts"))
        .await
        .unwrap()
        .fulfilled()
        .unwrap();
    assert!(none.is_empty());

    // Update
    let outcome = actions
        .update(
            doc.id,
            &DocumentPatch {
                filename: Some("resume-final.pdf".into()),
                category: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.fulfilled().unwrap().filename, "resume-final.pdf");
    assert!(actions.store().snapshot().updated);

    // Fetch one reflects the patch
    let fetched = actions
        .fetch_one(doc.id)
        .await
        .unwrap()
        .fulfilled()
        .unwrap();
    assert_eq!(fetched.filename, "resume-final.pdf");
    assert_eq!(fetched.category, "Job Applications");

    // Delete
    let outcome = actions.delete(doc.id).await.unwrap();
    assert!(outcome.is_fulfilled());
    let snapshot = actions.store().snapshot();
    assert_eq!(snapshot.delete.status, OperationStatus::Fulfilled);
    assert!(snapshot.deleted);

    // Fetching the deleted document settles as a recorded rejection
    let outcome = actions.fetch_one(doc.id).await.unwrap();
    match outcome {
        DispatchOutcome::Rejected {
            application_error, ..
        } => {
            assert_eq!(
                application_error.unwrap(),
                format!("Document {} not found", doc.id)
            );
        }
        DispatchOutcome::Fulfilled(_) => panic!("deleted document should not fetch"),
    }
    assert_eq!(
        actions.store().snapshot().fetch_one.status,
        OperationStatus::Rejected
    );
}

#[tokio::test]
async fn test_delete_of_missing_document_is_recorded_not_raised() {
    let (addr, token) = spawn_gateway().await;
    let actions = DocumentActions::new(api(addr, Some(&token)));

    let outcome = actions.delete(9999).await.unwrap();
    match outcome {
        DispatchOutcome::Rejected {
            application_error,
            transport_error,
        } => {
            assert_eq!(application_error.unwrap(), "Document 9999 not found");
            assert!(transport_error.unwrap().contains("404"));
        }
        DispatchOutcome::Fulfilled(_) => panic!("delete of missing id should reject"),
    }

    let snapshot = actions.store().snapshot();
    assert_eq!(snapshot.delete.status, OperationStatus::Rejected);
    assert_eq!(
        snapshot.delete.application_error.as_deref(),
        Some("Document 9999 not found")
    );
    // Rejected delete never signals navigation
    assert!(!snapshot.deleted);
}

#[tokio::test]
async fn test_gate_rejection_flows_into_lifecycle() {
    let (addr, _token) = spawn_gateway().await;
    // No bearer token on the transport
    let actions = DocumentActions::new(api(addr, None));

    let outcome = actions
        .upload(&NewDocument {
            filename: "x.pdf".into(),
            category: "Misc".into(),
            image: vec![1, 2, 3],
            user: "Nobody".into(),
        })
        .await
        .unwrap();

    match outcome {
        DispatchOutcome::Rejected {
            application_error, ..
        } => {
            assert_eq!(
                application_error.unwrap(),
                "No token attached to headers or it has expired"
            );
        }
        DispatchOutcome::Fulfilled(_) => panic!("upload without token should reject"),
    }

    let snapshot = actions.store().snapshot();
    assert_eq!(snapshot.upload.status, OperationStatus::Rejected);
    assert!(!snapshot.created);
}

#[tokio::test]
async fn test_no_response_failure_restores_snapshot_and_reraises() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let actions = DocumentActions::new(api(dead_addr, None));

    // Give the record a non-default value so restoration is observable
    actions.store().apply(StoreEvent::Fulfilled(
        OperationKind::FetchAll,
        OperationOutput::Many(vec![]),
    ));
    let before = actions.store().snapshot();

    let err = actions.fetch_all(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
    assert!(!err.server_responded());

    // Settled snapshot equals the pre-dispatch one; nothing recorded
    assert_eq!(actions.store().snapshot(), before);
}

#[tokio::test]
async fn test_overlapping_fetches_settle_fulfilled() {
    let (addr, token) = spawn_gateway().await;
    let actions = DocumentActions::new(api(addr, Some(&token)));

    // No dedup: concurrent dispatches of the same kind are all allowed
    let outcomes = futures_util::future::join_all(vec![
        actions.fetch_all(None),
        actions.fetch_all(Some("Misc")),
        actions.fetch_all(None),
    ])
    .await;

    for outcome in outcomes {
        assert!(outcome.unwrap().is_fulfilled());
    }
    assert_eq!(
        actions.store().snapshot().fetch_all.status,
        OperationStatus::Fulfilled
    );
}
