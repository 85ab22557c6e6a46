use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::company::Company;
use crate::models::job::{Job, JobWithApplicants, JobWithCompany, NewJob};
use crate::models::JobId;
use crate::policy::{authorize, Action, Principal};
use crate::store::Store;
use crate::validation::{parse_salary, required_text, Numeric};

/// Body of `POST /api/company/post-job`. Every field is optional at the
/// serde level so that missing fields surface as validation errors.
#[derive(Debug, Default, Deserialize)]
pub struct PostJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<Numeric>,
    pub level: Option<String>,
    pub category: Option<String>,
}

impl PostJobRequest {
    /// Produces the row to insert. Ownership and timestamp come from the
    /// server, never from the request.
    pub fn validate(self, company_id: i64, now: DateTime<Utc>) -> Result<NewJob, AppError> {
        Ok(NewJob {
            title: required_text("title", self.title)?,
            description: required_text("description", self.description)?,
            location: required_text("location", self.location)?,
            salary: parse_salary(self.salary.as_ref())?,
            level: required_text("level", self.level)?,
            category: required_text("category", self.category)?,
            company_id,
            created_at: now,
        })
    }
}

pub async fn list_visible_jobs(
    store: &dyn Store,
    principal: &Principal,
) -> Result<Vec<JobWithCompany>, AppError> {
    authorize(principal, &Action::ListJobs)?;
    Ok(store.list_visible_jobs().await?)
}

pub async fn get_job(
    store: &dyn Store,
    principal: &Principal,
    job_id: JobId,
) -> Result<JobWithCompany, AppError> {
    let found = store
        .find_job_with_company(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    authorize(principal, &Action::ReadJob(&found.job))?;
    Ok(found)
}

pub async fn post_job(
    store: &dyn Store,
    company: &Company,
    request: PostJobRequest,
) -> Result<Job, AppError> {
    authorize(&Principal::Company(company.id), &Action::PostJob)?;
    let new_job = request.validate(company.id, Utc::now())?;
    let job = store.create_job(new_job).await?;
    info!("Company {} posted job {}", company.id, job.id);
    Ok(job)
}

pub async fn list_company_jobs(
    store: &dyn Store,
    company: &Company,
) -> Result<Vec<JobWithApplicants>, AppError> {
    authorize(&Principal::Company(company.id), &Action::ListCompanyJobs)?;
    Ok(store.list_company_jobs(company.id).await?)
}

/// Flips `visible`. Existing applications are untouched: hiding a job only
/// stops new applicants.
pub async fn toggle_visibility(
    store: &dyn Store,
    company: &Company,
    job_id: JobId,
) -> Result<Job, AppError> {
    let job = store
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    authorize(&Principal::Company(company.id), &Action::ToggleVisibility(&job))?;

    let updated = store.set_job_visibility(job.id, !job.visible).await?;
    info!(
        "Company {} set job {} visible={}",
        company.id, updated.id, updated.visible
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{seed_company, seed_job};

    fn request() -> PostJobRequest {
        PostJobRequest {
            title: Some("Rust Engineer".to_string()),
            description: Some("Own the API".to_string()),
            location: Some("Remote".to_string()),
            salary: Some(Numeric::Text("120000".to_string())),
            level: Some("Senior".to_string()),
            category: Some("Programming".to_string()),
        }
    }

    #[tokio::test]
    async fn test_post_job_is_visible_and_server_stamped() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "Acme").await;

        let before = Utc::now();
        let job = post_job(&store, &company, request()).await.unwrap();

        assert!(job.visible);
        assert_eq!(job.company_id, company.id);
        assert_eq!(job.salary, 120_000);
        assert!(job.created_at >= before && job.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_post_job_rejects_bad_salary_before_store() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "Acme").await;
        let bad = PostJobRequest {
            salary: Some(Numeric::Text("a lot".to_string())),
            ..request()
        };

        let err = post_job(&store, &company, bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list_company_jobs(company.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let err = PostJobRequest::default().validate(1, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "title is required"));
    }

    #[tokio::test]
    async fn test_toggle_visibility_is_involutive() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "Acme").await;
        let job = seed_job(&store, company.id, "Designer").await;

        let hidden = toggle_visibility(&store, &company, job.id).await.unwrap();
        assert!(!hidden.visible);
        let shown = toggle_visibility(&store, &company, job.id).await.unwrap();
        assert_eq!(shown.visible, job.visible);
        assert_eq!(shown, job);
    }

    #[tokio::test]
    async fn test_toggle_foreign_job_is_forbidden_and_unchanged() {
        let store = MemoryStore::new();
        let owner = seed_company(&store, "Acme").await;
        let other = seed_company(&store, "Globex").await;
        let job = seed_job(&store, owner.id, "Designer").await;

        let err = toggle_visibility(&store, &other, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(store.find_job(job.id).await.unwrap().unwrap().visible);
    }

    #[tokio::test]
    async fn test_toggle_missing_job_is_not_found() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "Acme").await;
        let err = toggle_visibility(&store, &company, 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_hidden_jobs_leave_the_catalog() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "Acme").await;
        let shown = seed_job(&store, company.id, "Shown").await;
        let hidden = seed_job(&store, company.id, "Hidden").await;
        toggle_visibility(&store, &company, hidden.id).await.unwrap();

        let catalog = list_visible_jobs(&store, &Principal::Anonymous).await.unwrap();
        let ids: Vec<_> = catalog.iter().map(|j| j.job.id).collect();
        assert_eq!(ids, vec![shown.id]);
        assert_eq!(catalog[0].company.id, company.id);

        let err = get_job(&store, &Principal::Anonymous, hidden.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let own = get_job(&store, &Principal::Company(company.id), hidden.id)
            .await
            .unwrap();
        assert!(!own.job.visible);

        let listed = list_company_jobs(&store, &company).await.unwrap();
        assert_eq!(listed.len(), 2);
    }
}
