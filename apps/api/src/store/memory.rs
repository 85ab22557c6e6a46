//! In-process `Store` used by unit and router tests. Mirrors the constraints
//! the PostgreSQL schema enforces (unique email, unique (user, job), foreign
//! keys, cascading user deletes).

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::applications::lifecycle::INITIAL_STATUS;
use crate::models::application::{
    ApplicantView, ApplicationStatus, JobApplication, NewApplication, UserApplicationView,
};
use crate::models::company::{Company, CompanyBrief, NewCompany};
use crate::models::job::{Job, JobSummary, JobWithApplicants, JobWithCompany, NewJob};
use crate::models::user::{ApplicantBrief, User, UserProfileSync};
use crate::models::{ApplicationId, CompanyId, JobId, UserId};

use super::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    companies: BTreeMap<CompanyId, Company>,
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, JobApplication>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn job_with_company(&self, job: &Job) -> Option<JobWithCompany> {
        self.companies.get(&job.company_id).map(|c| JobWithCompany {
            job: job.clone(),
            company: c.profile(),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        Ok(self.lock()?.companies.get(&id).cloned())
    }

    async fn find_company_by_email(&self, email: &str) -> StoreResult<Option<Company>> {
        Ok(self
            .lock()?
            .companies
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn create_company(&self, company: NewCompany) -> StoreResult<Company> {
        let mut tables = self.lock()?;
        if tables.companies.values().any(|c| c.email == company.email) {
            return Err(StoreError::UniqueViolation("companies_email_key".to_string()));
        }
        let now = Utc::now();
        let row = Company {
            id: tables.next_id(),
            name: company.name,
            email: company.email,
            password_hash: company.password_hash,
            image: company.image,
            created_at: now,
            updated_at: now,
        };
        tables.companies.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn upsert_user(&self, profile: UserProfileSync) -> StoreResult<User> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|u| u.email == profile.email && u.id != profile.id)
        {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }
        let now = Utc::now();
        let user = match tables.users.get(&profile.id) {
            Some(existing) => User {
                name: profile.name,
                email: profile.email,
                image: profile.image,
                updated_at: now,
                ..existing.clone()
            },
            None => User {
                id: profile.id,
                name: profile.name,
                email: profile.email,
                image: profile.image,
                resume: None,
                created_at: now,
                updated_at: now,
            },
        };
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let removed = tables.users.remove(id).is_some();
        if removed {
            tables.applications.retain(|_, a| a.user_id != id);
        }
        Ok(removed)
    }

    async fn set_user_resume(&self, id: &str, resume_url: &str) -> StoreResult<User> {
        let mut tables = self.lock()?;
        let user = tables.users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.resume = Some(resume_url.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_job(&self, job: NewJob) -> StoreResult<Job> {
        let mut tables = self.lock()?;
        if !tables.companies.contains_key(&job.company_id) {
            return Err(StoreError::ForeignKeyViolation("jobs_company_id_fkey".to_string()));
        }
        let row = Job {
            id: tables.next_id(),
            title: job.title,
            description: job.description,
            location: job.location,
            salary: job.salary,
            level: job.level,
            category: job.category,
            visible: true,
            company_id: job.company_id,
            created_at: job.created_at,
        };
        tables.jobs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_job(&self, id: JobId) -> StoreResult<Option<Job>> {
        Ok(self.lock()?.jobs.get(&id).cloned())
    }

    async fn find_job_with_company(&self, id: JobId) -> StoreResult<Option<JobWithCompany>> {
        let tables = self.lock()?;
        Ok(tables
            .jobs
            .get(&id)
            .and_then(|job| tables.job_with_company(job)))
    }

    async fn list_visible_jobs(&self) -> StoreResult<Vec<JobWithCompany>> {
        let tables = self.lock()?;
        Ok(tables
            .jobs
            .values()
            .filter(|j| j.visible)
            .filter_map(|j| tables.job_with_company(j))
            .collect())
    }

    async fn list_company_jobs(&self, company_id: CompanyId) -> StoreResult<Vec<JobWithApplicants>> {
        let tables = self.lock()?;
        Ok(tables
            .jobs
            .values()
            .filter(|j| j.company_id == company_id)
            .map(|j| JobWithApplicants {
                job: j.clone(),
                applicants: tables
                    .applications
                    .values()
                    .filter(|a| a.job_id == j.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn set_job_visibility(&self, id: JobId, visible: bool) -> StoreResult<Job> {
        let mut tables = self.lock()?;
        let job = tables.jobs.get_mut(&id).ok_or(StoreError::NotFound)?;
        job.visible = visible;
        Ok(job.clone())
    }

    async fn find_application(&self, id: ApplicationId) -> StoreResult<Option<JobApplication>> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    async fn find_application_for(
        &self,
        user_id: &str,
        job_id: JobId,
    ) -> StoreResult<Option<JobApplication>> {
        Ok(self
            .lock()?
            .applications
            .values()
            .find(|a| a.user_id == user_id && a.job_id == job_id)
            .cloned())
    }

    async fn create_application(&self, application: NewApplication) -> StoreResult<JobApplication> {
        // Yield so concurrent callers interleave between their existence
        // check and this insert, as they would against a real database.
        tokio::task::yield_now().await;

        let mut tables = self.lock()?;
        if !tables.users.contains_key(&application.user_id) {
            return Err(StoreError::ForeignKeyViolation(
                "job_applications_user_id_fkey".to_string(),
            ));
        }
        if !tables.jobs.contains_key(&application.job_id) {
            return Err(StoreError::ForeignKeyViolation(
                "job_applications_job_id_fkey".to_string(),
            ));
        }
        if tables
            .applications
            .values()
            .any(|a| a.user_id == application.user_id && a.job_id == application.job_id)
        {
            return Err(StoreError::UniqueViolation(
                "job_applications_user_job_key".to_string(),
            ));
        }
        let row = JobApplication {
            id: tables.next_id(),
            user_id: application.user_id,
            job_id: application.job_id,
            company_id: application.company_id,
            status: INITIAL_STATUS,
            created_at: Utc::now(),
        };
        tables.applications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_user_applications(&self, user_id: &str) -> StoreResult<Vec<UserApplicationView>> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let job = tables.jobs.get(&a.job_id)?;
                let company = tables.companies.get(&a.company_id)?;
                Some(UserApplicationView {
                    application: a.clone(),
                    job: JobSummary::from(job),
                    company: CompanyBrief {
                        name: company.name.clone(),
                        email: company.email.clone(),
                        image: company.image.clone(),
                    },
                })
            })
            .collect())
    }

    async fn list_company_applications(
        &self,
        company_id: CompanyId,
        job_id: Option<JobId>,
    ) -> StoreResult<Vec<ApplicantView>> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .values()
            .filter(|a| a.company_id == company_id)
            .filter(|a| job_id.map_or(true, |id| a.job_id == id))
            .filter_map(|a| {
                let job = tables.jobs.get(&a.job_id)?;
                let user = tables.users.get(&a.user_id)?;
                Some(ApplicantView {
                    application: a.clone(),
                    user: ApplicantBrief {
                        name: user.name.clone(),
                        image: user.image.clone(),
                        resume: user.resume.clone(),
                    },
                    job: JobSummary::from(job),
                })
            })
            .collect())
    }

    async fn update_application_status(
        &self,
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> StoreResult<Option<JobApplication>> {
        let mut tables = self.lock()?;
        let application = tables.applications.get_mut(&id).ok_or(StoreError::NotFound)?;
        if application.status != from {
            return Ok(None);
        }
        application.status = to;
        Ok(Some(application.clone()))
    }
}
