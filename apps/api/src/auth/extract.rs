//! Axum extractors resolving the principal behind a request.
//!
//! Company tokens arrive as `Authorization: Bearer <token>` or in a `token`
//! header. User session tokens arrive as `Authorization: Bearer <token>`.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::errors::AppError;
use crate::models::company::Company;
use crate::models::{CompanyId, UserId};
use crate::policy::Principal;
use crate::state::AppState;

/// An authenticated company, loaded from the store.
#[derive(Debug, Clone)]
pub struct AuthCompany(pub Company);

/// An authenticated job seeker.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

/// Reader of the public job catalog: the owning company when a valid
/// company token is sent, anonymous otherwise. Never consults the identity
/// provider, so a stale session or a provider outage cannot lock out
/// anonymous readers.
#[derive(Debug, Clone)]
pub struct CatalogReader(pub Principal);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn company_token(parts: &Parts) -> Option<&str> {
    bearer_token(parts).or_else(|| {
        parts
            .headers
            .get("token")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthCompany {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = company_token(parts).ok_or_else(|| {
            AppError::Unauthenticated("Not authorized, no token provided.".to_string())
        })?;

        let company_id = state.company_tokens.verify(token).map_err(|e| {
            debug!("Company token rejected: {e}");
            AppError::Unauthenticated("Not authorized, token failed.".to_string())
        })?;

        Ok(AuthCompany(existing_company(state, company_id).await?))
    }
}

/// Looks up the company behind a verified token.
async fn existing_company(state: &AppState, company_id: CompanyId) -> Result<Company, AppError> {
    state
        .store
        .find_company(company_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, company not found.".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthenticated("Not authorized, login required.".to_string())
        })?;
        let user_id = state.identity.authenticate(token).await?;
        Ok(AuthUser(user_id))
    }
}

/// Resolves whoever is calling, falling back to `Anonymous`.
///
/// A valid company token wins if its company still exists; otherwise a
/// bearer token is offered to the identity provider. Credentials that are present but invalid are rejected
/// rather than silently downgraded to anonymous.
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(token) = company_token(parts) {
            if let Ok(company_id) = state.company_tokens.verify(token) {
                let company = existing_company(state, company_id).await?;
                return Ok(Principal::Company(company.id));
            }
        }
        match bearer_token(parts) {
            Some(token) => Ok(Principal::User(state.identity.authenticate(token).await?)),
            None if parts.headers.contains_key("token") => Err(AppError::Unauthenticated(
                "Not authorized, token failed.".to_string(),
            )),
            None => Ok(Principal::Anonymous),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CatalogReader {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(company_id) = company_token(parts).and_then(|t| state.company_tokens.verify(t).ok())
        else {
            return Ok(CatalogReader(Principal::Anonymous));
        };
        match state.store.find_company(company_id).await? {
            Some(company) => Ok(CatalogReader(Principal::Company(company.id))),
            None => {
                debug!("Catalog token names unknown company {company_id}");
                Ok(CatalogReader(Principal::Anonymous))
            }
        }
    }
}
