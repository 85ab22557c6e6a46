use std::sync::Arc;

use crate::auth::CompanyTokens;
use crate::identity::{IdentityProvider, WebhookVerifier};
use crate::storage::FileStorage;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is constructed once in `main` and passed in here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub storage: Arc<dyn FileStorage>,
    /// Validates job-seeker session tokens.
    pub identity: Arc<dyn IdentityProvider>,
    pub company_tokens: CompanyTokens,
    pub webhook_verifier: WebhookVerifier,
    pub max_upload_bytes: usize,
}
