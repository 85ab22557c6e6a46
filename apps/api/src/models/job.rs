use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::company::CompanyProfile;
use super::{CompanyId, JobId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: i64,
    pub level: String,
    pub category: String,
    pub visible: bool,
    pub company_id: CompanyId,
    pub created_at: DateTime<Utc>,
}

/// A validated posting. `created_at` is stamped by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: i64,
    pub level: String,
    pub category: String,
    pub company_id: CompanyId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: Job,
    pub company: CompanyProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobWithApplicants {
    #[serde(flatten)]
    pub job: Job,
    pub applicants: i64,
}

/// Job fields embedded in application listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub level: String,
    pub salary: i64,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        JobSummary {
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            category: job.category.clone(),
            level: job.level.clone(),
            salary: job.salary,
        }
    }
}
