//! Authorization rules for jobs and applications.
//!
//! `authorize` is pure: it looks only at the acting principal and the target
//! carried by the action, and decides before any mutation happens. Rules are
//! evaluated in order:
//!
//! 1. Anonymous principals may only read the visible job catalog.
//! 2. Company actions (post, toggle visibility, list applicants) require the
//!    company to own the job.
//! 3. A user may apply to a visible job at most once.
//! 4. Applications are readable by the applying user and the hiring company.
//! 5. Status changes come only from the hiring company and must request a
//!    terminal status.
//!
//! Hidden jobs are reported as missing to everyone except their owner.

use thiserror::Error;

use crate::errors::AppError;
use crate::models::application::{ApplicationStatus, JobApplication};
use crate::models::job::Job;
use crate::models::{CompanyId, UserId};

/// The authenticated actor behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Company(CompanyId),
    User(UserId),
}

impl Principal {
    fn owns_job(&self, job: &Job) -> bool {
        matches!(self, Principal::Company(id) if *id == job.company_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    ListJobs,
    ReadJob(&'a Job),
    PostJob,
    ListCompanyJobs,
    ToggleVisibility(&'a Job),
    ListApplicants(&'a Job),
    ListAllApplicants,
    Apply {
        job: &'a Job,
        existing: Option<&'a JobApplication>,
    },
    ListOwnApplications,
    ReadApplication(&'a JobApplication),
    ChangeStatus {
        application: &'a JobApplication,
        requested: ApplicationStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Invalid(&'static str),
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        let message = denial.to_string();
        match denial {
            Denial::Unauthenticated(_) => AppError::Unauthenticated(message),
            Denial::Forbidden(_) => AppError::Forbidden(message),
            Denial::NotFound(_) => AppError::NotFound(message),
            Denial::Conflict(_) => AppError::Conflict(message),
            Denial::Invalid(_) => AppError::Validation(message),
        }
    }
}

const NOT_AUTHENTICATED: &str = "Not authorized, login required.";
const COMPANY_ONLY: &str = "Only a company account can perform this action.";
const USER_ONLY: &str = "Only a user account can perform this action.";
const NOT_JOB_OWNER: &str = "You are not authorized to change this job.";
const NOT_APPLICANTS_OWNER: &str = "You are not authorized to view applicants for this job.";
const JOB_NOT_FOUND: &str = "Job not found";
const JOB_CLOSED: &str = "This job is not accepting applications.";
const ALREADY_APPLIED: &str = "You have already applied for this job.";
const NOT_APPLICATION_PARTY: &str = "You are not authorized to view this application.";
const NOT_APPLICATION_OWNER: &str = "You are not authorized to change this application.";
const STATUS_NOT_TERMINAL: &str = "Status must be either Accepted or Rejected.";

pub fn authorize(principal: &Principal, action: &Action<'_>) -> Result<(), Denial> {
    if *principal == Principal::Anonymous {
        return match action {
            Action::ListJobs => Ok(()),
            Action::ReadJob(job) if job.visible => Ok(()),
            Action::ReadJob(_) => Err(Denial::NotFound(JOB_NOT_FOUND)),
            _ => Err(Denial::Unauthenticated(NOT_AUTHENTICATED)),
        };
    }

    match action {
        Action::ListJobs => Ok(()),
        Action::ReadJob(job) => {
            if job.visible || principal.owns_job(job) {
                Ok(())
            } else {
                Err(Denial::NotFound(JOB_NOT_FOUND))
            }
        }
        Action::PostJob | Action::ListCompanyJobs | Action::ListAllApplicants => {
            require_company(principal)
        }
        Action::ToggleVisibility(job) => {
            require_company(principal)?;
            ensure(principal.owns_job(job), Denial::Forbidden(NOT_JOB_OWNER))
        }
        Action::ListApplicants(job) => {
            require_company(principal)?;
            ensure(
                principal.owns_job(job),
                Denial::Forbidden(NOT_APPLICANTS_OWNER),
            )
        }
        Action::Apply { job, existing } => {
            let Principal::User(user_id) = principal else {
                return Err(Denial::Forbidden(USER_ONLY));
            };
            if !job.visible {
                return Err(Denial::Forbidden(JOB_CLOSED));
            }
            let duplicate = existing.is_some_and(|a| a.user_id == *user_id && a.job_id == job.id);
            ensure(!duplicate, Denial::Conflict(ALREADY_APPLIED))
        }
        Action::ListOwnApplications => match principal {
            Principal::User(_) => Ok(()),
            _ => Err(Denial::Forbidden(USER_ONLY)),
        },
        Action::ReadApplication(application) => {
            let allowed = match principal {
                Principal::User(id) => *id == application.user_id,
                Principal::Company(id) => *id == application.company_id,
                Principal::Anonymous => false,
            };
            ensure(allowed, Denial::Forbidden(NOT_APPLICATION_PARTY))
        }
        Action::ChangeStatus {
            application,
            requested,
        } => {
            require_company(principal)?;
            ensure(
                *principal == Principal::Company(application.company_id),
                Denial::Forbidden(NOT_APPLICATION_OWNER),
            )?;
            ensure(requested.is_terminal(), Denial::Invalid(STATUS_NOT_TERMINAL))
        }
    }
}

/// Duplicate-application guard: a user may hold at most one application
/// per job. The store's unique constraint backs this up under races.
pub fn can_apply(user_id: &str, job: &Job, existing: Option<&JobApplication>) -> Result<(), Denial> {
    authorize(
        &Principal::User(user_id.to_string()),
        &Action::Apply { job, existing },
    )
}

fn require_company(principal: &Principal) -> Result<(), Denial> {
    match principal {
        Principal::Company(_) => Ok(()),
        _ => Err(Denial::Forbidden(COMPANY_ONLY)),
    }
}

fn ensure(condition: bool, denial: Denial) -> Result<(), Denial> {
    if condition {
        Ok(())
    } else {
        Err(denial)
    }
}
