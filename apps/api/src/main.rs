mod applications;
mod auth;
mod companies;
mod config;
mod db;
mod errors;
mod identity;
mod jobs;
mod models;
mod multipart;
mod policy;
mod routes;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod test_support;
mod users;
mod validation;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::CompanyTokens;
use crate::config::Config;
use crate::db::create_pool;
use crate::identity::{ClerkClient, WebhookVerifier};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3Storage;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hireboard API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let storage = Arc::new(S3Storage::new(
        s3,
        config.s3_bucket.clone(),
        config.s3_public_url.clone(),
    ));
    info!("S3 storage initialized (bucket: {})", config.s3_bucket);

    // Identity provider and webhook signing
    let identity = Arc::new(
        ClerkClient::new(config.clerk_secret_key.clone())
            .context("Failed to build identity provider client")?,
    );
    let webhook_verifier = WebhookVerifier::new(&config.clerk_webhook_secret)
        .context("CLERK_WEBHOOK_SECRET is malformed")?;
    info!("Identity provider client initialized");

    let company_tokens = CompanyTokens::new(
        config.jwt_secret.clone(),
        chrono::Duration::days(config.company_token_ttl_days),
    );

    // Build app state
    let state = AppState {
        store,
        storage,
        identity,
        company_tokens,
        webhook_verifier,
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "hireboard-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
