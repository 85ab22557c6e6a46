//! Shared fixtures for unit and router tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::auth::CompanyTokens;
use crate::identity::{IdentityError, IdentityProvider, WebhookVerifier};
use crate::models::company::{Company, NewCompany};
use crate::models::job::{Job, NewJob};
use crate::models::user::{User, UserProfileSync};
use crate::models::{CompanyId, UserId};
use crate::state::AppState;
use crate::storage::testing::RecordingStorage;
use crate::store::memory::MemoryStore;
use crate::store::Store;

pub const WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

/// Accepts session tokens of the form `session:<user id>`.
pub struct StaticIdentity;

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn authenticate(&self, session_token: &str) -> Result<UserId, IdentityError> {
        session_token
            .strip_prefix("session:")
            .map(str::to_string)
            .ok_or_else(|| IdentityError::Rejected("unknown session".to_string()))
    }
}

/// Fails every lookup as if the provider were down.
pub struct UnreachableIdentity;

#[async_trait]
impl IdentityProvider for UnreachableIdentity {
    async fn authenticate(&self, _session_token: &str) -> Result<UserId, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".to_string()))
    }
}

pub fn user_session(user_id: &str) -> String {
    format!("session:{user_id}")
}

pub fn company_tokens() -> CompanyTokens {
    CompanyTokens::new("test-secret", Duration::days(1))
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    test_state_with_storage(store, Arc::new(RecordingStorage::default()))
}

pub fn test_state_with_storage(store: Arc<MemoryStore>, storage: Arc<RecordingStorage>) -> AppState {
    AppState {
        store,
        storage,
        identity: Arc::new(StaticIdentity),
        company_tokens: company_tokens(),
        webhook_verifier: WebhookVerifier::new(WEBHOOK_SECRET).expect("valid test secret"),
        max_upload_bytes: 1024 * 1024,
    }
}

pub async fn seed_company(store: &dyn Store, name: &str) -> Company {
    store
        .create_company(NewCompany {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "$argon2id$placeholder".to_string(),
            image: format!("https://cdn.test/logos/{name}.png"),
        })
        .await
        .expect("seed company")
}

pub async fn seed_user(store: &dyn Store, id: &str) -> User {
    store
        .upsert_user(UserProfileSync {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            image: String::new(),
        })
        .await
        .expect("seed user")
}

pub async fn seed_job(store: &dyn Store, company_id: CompanyId, title: &str) -> Job {
    store
        .create_job(NewJob {
            title: title.to_string(),
            description: "<p>Ship things</p>".to_string(),
            location: "Berlin".to_string(),
            salary: 90_000,
            level: "Intermediate".to_string(),
            category: "Programming".to_string(),
            company_id,
            created_at: Utc::now(),
        })
        .await
        .expect("seed job")
}
