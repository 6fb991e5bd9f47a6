//! Docvault - bearer-token gateway for stored documents

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docvault::{
    auth::{AuthGate, TokenVerifier},
    config::Args,
    db::{DocumentRepository, MemoryDirectory, PrincipalRecord},
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("docvault={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Docvault - Document Gateway");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" }
    );
    info!("Token expiry: {}s", args.jwt_expiry_seconds);
    info!("======================================");

    // Build the token verifier
    let verifier = if args.dev_mode {
        TokenVerifier::new_dev()
    } else {
        match TokenVerifier::new(
            args.jwt_secret.clone().unwrap_or_default(),
            args.jwt_expiry_seconds,
        ) {
            Ok(v) => v,
            Err(e) => {
                error!("Configuration error: {}", e);
                std::process::exit(1);
            }
        }
    };

    // Principal directory; dev mode seeds one principal and logs a usable
    // token so the protected routes can be exercised immediately
    let directory = Arc::new(MemoryDirectory::new());
    if args.dev_mode {
        directory.insert(PrincipalRecord {
            id: "dev-user".into(),
            name: "Dev User".into(),
            email: "dev@localhost".into(),
            password_hash: "$argon2id$dev-stub".into(),
        });
        match verifier.issue("dev-user") {
            Ok(token) => info!("Dev principal seeded; bearer token: {}", token),
            Err(e) => warn!("Failed to issue dev token: {}", e),
        }
    }

    let gate = AuthGate::new(verifier, directory);
    let documents = Arc::new(DocumentRepository::new());

    // Create application state and run the server
    let state = Arc::new(server::AppState::new(args, gate, documents));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
