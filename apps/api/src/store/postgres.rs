use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::applications::lifecycle::INITIAL_STATUS;
use crate::models::application::{
    ApplicantView, ApplicationStatus, JobApplication, NewApplication, UserApplicationView,
};
use crate::models::company::{Company, CompanyBrief, CompanyProfile, NewCompany};
use crate::models::job::{Job, JobSummary, JobWithApplicants, JobWithCompany, NewJob};
use crate::models::user::{ApplicantBrief, User, UserProfileSync};
use crate::models::{ApplicationId, CompanyId, JobId};

use super::{Store, StoreResult};

const JOB_COLUMNS: &str = "j.id, j.title, j.description, j.location, j.salary, j.level, \
                           j.category, j.visible, j.company_id, j.created_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct JobCompanyRow {
    #[sqlx(flatten)]
    job: Job,
    company_name: String,
    company_email: String,
    company_image: String,
    company_created_at: DateTime<Utc>,
    company_updated_at: DateTime<Utc>,
}

impl From<JobCompanyRow> for JobWithCompany {
    fn from(row: JobCompanyRow) -> Self {
        let company = CompanyProfile {
            id: row.job.company_id,
            name: row.company_name,
            email: row.company_email,
            image: row.company_image,
            created_at: row.company_created_at,
            updated_at: row.company_updated_at,
        };
        JobWithCompany {
            job: row.job,
            company,
        }
    }
}

#[derive(FromRow)]
struct JobCountRow {
    #[sqlx(flatten)]
    job: Job,
    applicants: i64,
}

#[derive(FromRow)]
struct ApplicationJoinRow {
    #[sqlx(flatten)]
    application: JobApplication,
    job_title: String,
    job_description: String,
    job_location: String,
    job_category: String,
    job_level: String,
    job_salary: i64,
    company_name: String,
    company_email: String,
    company_image: String,
    user_name: String,
    user_image: String,
    user_resume: Option<String>,
}

impl ApplicationJoinRow {
    fn job_summary(&self) -> JobSummary {
        JobSummary {
            title: self.job_title.clone(),
            description: self.job_description.clone(),
            location: self.job_location.clone(),
            category: self.job_category.clone(),
            level: self.job_level.clone(),
            salary: self.job_salary,
        }
    }
}

const APPLICATION_JOIN: &str = r#"
    SELECT a.id, a.user_id, a.job_id, a.company_id, a.status, a.created_at,
           j.title AS job_title, j.description AS job_description,
           j.location AS job_location, j.category AS job_category,
           j.level AS job_level, j.salary AS job_salary,
           c.name AS company_name, c.email AS company_email, c.image AS company_image,
           u.name AS user_name, u.image AS user_image, u.resume AS user_resume
    FROM job_applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN companies c ON c.id = a.company_id
    JOIN users u ON u.id = a.user_id
"#;

#[async_trait]
impl Store for PgStore {
    async fn find_company(&self, id: CompanyId) -> StoreResult<Option<Company>> {
        Ok(
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_company_by_email(&self, email: &str) -> StoreResult<Option<Company>> {
        Ok(
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_company(&self, company: NewCompany) -> StoreResult<Company> {
        Ok(sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, email, password_hash, image)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.password_hash)
        .bind(&company.image)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn upsert_user(&self, profile: UserProfileSync) -> StoreResult<User> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    image = EXCLUDED.image,
                    updated_at = now()
            RETURNING *
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.image)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_user_resume(&self, id: &str, resume_url: &str) -> StoreResult<User> {
        Ok(sqlx::query_as::<_, User>(
            "UPDATE users SET resume = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(resume_url)
        .bind(id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_job(&self, job: NewJob) -> StoreResult<Job> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (title, description, location, salary, level, category, company_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, location, salary, level, category,
                      visible, company_id, created_at
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.salary)
        .bind(&job.level)
        .bind(&job.category)
        .bind(job.company_id)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_job(&self, id: JobId) -> StoreResult<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_job_with_company(&self, id: JobId) -> StoreResult<Option<JobWithCompany>> {
        let row = sqlx::query_as::<_, JobCompanyRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS},
                   c.name AS company_name, c.email AS company_email, c.image AS company_image,
                   c.created_at AS company_created_at, c.updated_at AS company_updated_at
            FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE j.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobWithCompany::from))
    }

    async fn list_visible_jobs(&self) -> StoreResult<Vec<JobWithCompany>> {
        let rows = sqlx::query_as::<_, JobCompanyRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS},
                   c.name AS company_name, c.email AS company_email, c.image AS company_image,
                   c.created_at AS company_created_at, c.updated_at AS company_updated_at
            FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE j.visible
            ORDER BY j.created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(JobWithCompany::from).collect())
    }

    async fn list_company_jobs(&self, company_id: CompanyId) -> StoreResult<Vec<JobWithApplicants>> {
        let rows = sqlx::query_as::<_, JobCountRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}, COUNT(a.id) AS applicants
            FROM jobs j
            LEFT JOIN job_applications a ON a.job_id = j.id
            WHERE j.company_id = $1
            GROUP BY j.id
            ORDER BY j.created_at DESC
            "#
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| JobWithApplicants {
                job: row.job,
                applicants: row.applicants,
            })
            .collect())
    }

    async fn set_job_visibility(&self, id: JobId, visible: bool) -> StoreResult<Job> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET visible = $1 WHERE id = $2
            RETURNING id, title, description, location, salary, level, category,
                      visible, company_id, created_at
            "#,
        )
        .bind(visible)
        .bind(id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_application(&self, id: ApplicationId) -> StoreResult<Option<JobApplication>> {
        Ok(
            sqlx::query_as::<_, JobApplication>("SELECT * FROM job_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_application_for(
        &self,
        user_id: &str,
        job_id: JobId,
    ) -> StoreResult<Option<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            "SELECT * FROM job_applications WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_application(&self, application: NewApplication) -> StoreResult<JobApplication> {
        Ok(sqlx::query_as::<_, JobApplication>(
            r#"
            INSERT INTO job_applications (user_id, job_id, company_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&application.user_id)
        .bind(application.job_id)
        .bind(application.company_id)
        .bind(INITIAL_STATUS)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_user_applications(&self, user_id: &str) -> StoreResult<Vec<UserApplicationView>> {
        let rows = sqlx::query_as::<_, ApplicationJoinRow>(&format!(
            "{APPLICATION_JOIN} WHERE a.user_id = $1 ORDER BY a.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| UserApplicationView {
                job: row.job_summary(),
                company: CompanyBrief {
                    name: row.company_name,
                    email: row.company_email,
                    image: row.company_image,
                },
                application: row.application,
            })
            .collect())
    }

    async fn list_company_applications(
        &self,
        company_id: CompanyId,
        job_id: Option<JobId>,
    ) -> StoreResult<Vec<ApplicantView>> {
        let rows = sqlx::query_as::<_, ApplicationJoinRow>(&format!(
            r#"{APPLICATION_JOIN}
            WHERE a.company_id = $1 AND ($2::BIGINT IS NULL OR a.job_id = $2)
            ORDER BY a.created_at DESC"#
        ))
        .bind(company_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| ApplicantView {
                job: row.job_summary(),
                user: ApplicantBrief {
                    name: row.user_name,
                    image: row.user_image,
                    resume: row.user_resume,
                },
                application: row.application,
            })
            .collect())
    }

    async fn update_application_status(
        &self,
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> StoreResult<Option<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            r#"
            UPDATE job_applications SET status = $1
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(to)
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?)
    }
}
