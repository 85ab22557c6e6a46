//! Persistence boundary.
//!
//! Handlers never touch the database directly; they go through a `Store`
//! carried in `AppState` as `Arc<dyn Store>`. `PgStore` is the production
//! backend. Uniqueness and foreign keys are enforced by the backend itself
//! and reported through `StoreError`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::application::{
    ApplicantView, ApplicationStatus, JobApplication, NewApplication, UserApplicationView,
};
use crate::models::company::{Company, NewCompany};
use crate::models::job::{Job, JobWithApplicants, JobWithCompany, NewJob};
use crate::models::user::{User, UserProfileSync};
use crate::models::{ApplicationId, CompanyId, JobId};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) => {
                let constraint = db.constraint().unwrap_or_default().to_string();
                if db.is_unique_violation() {
                    StoreError::UniqueViolation(constraint)
                } else if db.is_foreign_key_violation() {
                    StoreError::ForeignKeyViolation(constraint)
                } else {
                    StoreError::Backend(err.to_string())
                }
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // Companies
    async fn find_company(&self, id: CompanyId) -> StoreResult<Option<Company>>;
    async fn find_company_by_email(&self, email: &str) -> StoreResult<Option<Company>>;
    async fn create_company(&self, company: NewCompany) -> StoreResult<Company>;

    // Users
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
    /// Inserts or refreshes the profile fields of a user. Idempotent.
    async fn upsert_user(&self, profile: UserProfileSync) -> StoreResult<User>;
    /// Returns whether a row was removed.
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;
    async fn set_user_resume(&self, id: &str, resume_url: &str) -> StoreResult<User>;

    // Jobs
    async fn create_job(&self, job: NewJob) -> StoreResult<Job>;
    async fn find_job(&self, id: JobId) -> StoreResult<Option<Job>>;
    async fn find_job_with_company(&self, id: JobId) -> StoreResult<Option<JobWithCompany>>;
    async fn list_visible_jobs(&self) -> StoreResult<Vec<JobWithCompany>>;
    async fn list_company_jobs(&self, company_id: CompanyId) -> StoreResult<Vec<JobWithApplicants>>;
    async fn set_job_visibility(&self, id: JobId, visible: bool) -> StoreResult<Job>;

    // Applications
    async fn find_application(&self, id: ApplicationId) -> StoreResult<Option<JobApplication>>;
    async fn find_application_for(
        &self,
        user_id: &str,
        job_id: JobId,
    ) -> StoreResult<Option<JobApplication>>;
    /// Fails with `UniqueViolation` if the (user, job) pair already applied.
    async fn create_application(&self, application: NewApplication) -> StoreResult<JobApplication>;
    async fn list_user_applications(&self, user_id: &str) -> StoreResult<Vec<UserApplicationView>>;
    /// Applications for a company's jobs, optionally narrowed to one job.
    async fn list_company_applications(
        &self,
        company_id: CompanyId,
        job_id: Option<JobId>,
    ) -> StoreResult<Vec<ApplicantView>>;
    /// Compare-and-set: only updates when the stored status equals `from`.
    /// Returns `None` when the status had already moved on.
    async fn update_application_status(
        &self,
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> StoreResult<Option<JobApplication>>;
}
