use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::CompanyId;

/// Full company row, including the password hash. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.image.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public view of a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Company contact details embedded in a user's application listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyBrief {
    pub name: String,
    pub email: String,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
}
