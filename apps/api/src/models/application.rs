use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::company::CompanyBrief;
use super::job::JobSummary;
use super::user::ApplicantBrief;
use super::{ApplicationId, CompanyId, JobId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub job_id: JobId,
    /// Copied from the job at creation.
    pub company_id: CompanyId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub user_id: UserId,
    pub job_id: JobId,
    pub company_id: CompanyId,
}

/// An application as listed for the applying user.
#[derive(Debug, Clone, Serialize)]
pub struct UserApplicationView {
    #[serde(flatten)]
    pub application: JobApplication,
    pub job: JobSummary,
    pub company: CompanyBrief,
}

/// An application as listed for the hiring company.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantView {
    #[serde(flatten)]
    pub application: JobApplication,
    pub user: ApplicantBrief,
    pub job: JobSummary,
}
