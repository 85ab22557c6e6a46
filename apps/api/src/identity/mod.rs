//! External identity provider integration.
//!
//! The provider owns user identity: it validates session tokens presented
//! by job seekers and pushes profile changes to us through signed webhooks.
//! `IdentityProvider` is the seam handlers depend on; `ClerkClient` is the
//! production implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::UserId;

pub mod clerk;
pub mod handlers;
pub mod sync;
pub mod webhook;

pub use clerk::ClerkClient;
pub use webhook::WebhookVerifier;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("session rejected: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(reason) => {
                tracing::debug!("User session rejected: {reason}");
                AppError::Unauthenticated("Not authorized, session is invalid.".to_string())
            }
            IdentityError::Unavailable(msg) => AppError::Identity(msg),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a session token to the provider's user id.
    async fn authenticate(&self, session_token: &str) -> Result<UserId, IdentityError>;
}
