//! Clerk session verification over the Backend API.
//!
//! Session tokens are JWTs whose `sid` claim names the session. The token is
//! handed back to Clerk for verification; only an `active` session
//! authenticates its user.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{IdentityError, IdentityProvider};
use crate::models::UserId;

const CLERK_API_URL: &str = "https://api.clerk.com/v1";

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ClerkSession {
    user_id: String,
    status: String,
}

#[derive(Clone)]
pub struct ClerkClient {
    client: Client,
    secret_key: String,
    api_url: String,
}

impl ClerkClient {
    pub fn new(secret_key: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            secret_key,
            api_url: CLERK_API_URL.to_string(),
        })
    }
}

/// Reads the claims of a session token and checks `exp` locally. The
/// signature is not checked here; Clerk does that during verification.
fn peek_claims(token: &str) -> Result<SessionClaims, IdentityError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    validation.leeway = 0;

    decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| IdentityError::Rejected(format!("session token rejected: {e}")))
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn authenticate(&self, session_token: &str) -> Result<UserId, IdentityError> {
        let claims = peek_claims(session_token)?;

        let response = self
            .client
            .post(format!("{}/sessions/{}/verify", self.api_url, claims.sid))
            .bearer_auth(&self.secret_key)
            .json(&json!({ "token": session_token }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            warn!("Clerk API returned {status}: {body}");
            return Err(IdentityError::Unavailable(format!("Clerk API returned {status}")));
        }
        if !status.is_success() {
            return Err(IdentityError::Rejected(format!(
                "Clerk rejected session {} with {status}",
                claims.sid
            )));
        }

        let session: ClerkSession = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("unexpected Clerk response: {e}")))?;
        if session.status != "active" {
            return Err(IdentityError::Rejected(format!(
                "session {} is {}",
                claims.sid, session.status
            )));
        }

        debug!("Authenticated user {} via session {}", session.user_id, claims.sid);
        Ok(session.user_id)
    }
}
