use tracing::{info, warn};

use crate::applications::lifecycle::{transition, InvalidTransition};
use crate::errors::AppError;
use crate::models::application::{
    ApplicantView, ApplicationStatus, JobApplication, NewApplication, UserApplicationView,
};
use crate::models::{ApplicationId, CompanyId, JobId};
use crate::policy::{authorize, can_apply, Action, Principal};
use crate::store::Store;

/// Submits an application for `user_id`. The existence check gives a clean
/// error on the common path; the store's unique constraint settles races.
pub async fn apply(
    store: &dyn Store,
    user_id: &str,
    job_id: JobId,
) -> Result<JobApplication, AppError> {
    let job = store
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User Not Found".to_string()));
    }

    let existing = store.find_application_for(user_id, job.id).await?;
    can_apply(user_id, &job, existing.as_ref())?;

    let application = store
        .create_application(NewApplication {
            user_id: user_id.to_string(),
            job_id: job.id,
            company_id: job.company_id,
        })
        .await?;
    info!("User {} applied to job {}", user_id, job.id);
    Ok(application)
}

pub async fn list_user_applications(
    store: &dyn Store,
    principal: &Principal,
) -> Result<Vec<UserApplicationView>, AppError> {
    authorize(principal, &Action::ListOwnApplications)?;
    let Principal::User(user_id) = principal else {
        return Err(AppError::Forbidden(
            "Only a user account can perform this action.".to_string(),
        ));
    };
    Ok(store.list_user_applications(user_id).await?)
}

/// Every application across the company's jobs.
pub async fn list_company_applicants(
    store: &dyn Store,
    company_id: CompanyId,
) -> Result<Vec<ApplicantView>, AppError> {
    authorize(&Principal::Company(company_id), &Action::ListAllApplicants)?;
    Ok(store.list_company_applications(company_id, None).await?)
}

pub async fn list_job_applicants(
    store: &dyn Store,
    company_id: CompanyId,
    job_id: JobId,
) -> Result<Vec<ApplicantView>, AppError> {
    let job = store
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    authorize(&Principal::Company(company_id), &Action::ListApplicants(&job))?;
    Ok(store.list_company_applications(company_id, Some(job.id)).await?)
}

pub async fn get_application(
    store: &dyn Store,
    principal: &Principal,
    application_id: ApplicationId,
) -> Result<JobApplication, AppError> {
    let application = store
        .find_application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    authorize(principal, &Action::ReadApplication(&application))?;
    Ok(application)
}

/// Moves a pending application to `Accepted` or `Rejected` on behalf of
/// the hiring company.
///
/// Order of checks: existence, ownership, requested status, transition.
/// The final write is a compare-and-set on the status read here, so two
/// concurrent decisions cannot both land.
pub async fn change_status(
    store: &dyn Store,
    company_id: CompanyId,
    application_id: ApplicationId,
    requested: ApplicationStatus,
) -> Result<JobApplication, AppError> {
    let application = store
        .find_application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    authorize(
        &Principal::Company(company_id),
        &Action::ChangeStatus {
            application: &application,
            requested,
        },
    )?;
    let next = transition(application.status, requested)?;

    match store
        .update_application_status(application.id, application.status, next)
        .await?
    {
        Some(updated) => {
            info!(
                "Application {} moved {} -> {}",
                updated.id, application.status, updated.status
            );
            Ok(updated)
        }
        None => {
            let current = store
                .find_application(application.id)
                .await?
                .map(|a| a.status)
                .unwrap_or(application.status);
            warn!(
                "Application {} changed concurrently, now {}",
                application.id, current
            );
            Err(InvalidTransition {
                from: current,
                to: requested,
            }
            .into())
        }
    }
}
