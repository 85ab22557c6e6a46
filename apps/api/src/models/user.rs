use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image: String,
    pub resume: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields pushed by the identity provider. The resume is owned by
/// the user and never overwritten by a sync.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfileSync {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image: String,
}

/// Applicant details shown to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantBrief {
    pub name: String,
    pub image: String,
    pub resume: Option<String>,
}
