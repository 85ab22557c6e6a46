use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::applications::service;
use crate::auth::{AuthCompany, AuthUser};
use crate::errors::AppError;
use crate::models::application::{ApplicantView, JobApplication, UserApplicationView};
use crate::policy::Principal;
use crate::state::AppState;
use crate::validation::{parse_id, parse_path_id, parse_status, required_text, Numeric};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: Option<Numeric>,
}

#[derive(Deserialize)]
pub struct ChangeStatusRequest {
    pub id: Option<Numeric>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub application: JobApplication,
}

#[derive(Serialize)]
pub struct UserApplicationsResponse {
    pub applications: Vec<UserApplicationView>,
}

#[derive(Serialize)]
pub struct ApplicantsResponse {
    pub applications: Vec<ApplicantView>,
}

/// POST /api/users/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let Json(req) = body?;
    let job_id = parse_id("jobId", req.job_id.as_ref())?;
    let application = service::apply(state.store.as_ref(), &user_id, job_id).await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse { application })))
}

/// GET /api/users/applications
pub async fn handle_user_applications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserApplicationsResponse>, AppError> {
    let applications =
        service::list_user_applications(state.store.as_ref(), &Principal::User(user_id)).await?;
    Ok(Json(UserApplicationsResponse { applications }))
}

/// GET /api/company/applicants
pub async fn handle_company_applicants(
    State(state): State<AppState>,
    AuthCompany(company): AuthCompany,
) -> Result<Json<ApplicantsResponse>, AppError> {
    let applications = service::list_company_applicants(state.store.as_ref(), company.id).await?;
    Ok(Json(ApplicantsResponse { applications }))
}

/// GET /api/company/jobs/:id/applicants
pub async fn handle_job_applicants(
    State(state): State<AppState>,
    AuthCompany(company): AuthCompany,
    Path(raw_id): Path<String>,
) -> Result<Json<ApplicantsResponse>, AppError> {
    let job_id = parse_path_id("job id", &raw_id)?;
    let applications =
        service::list_job_applicants(state.store.as_ref(), company.id, job_id).await?;
    Ok(Json(ApplicantsResponse { applications }))
}

/// POST /api/company/change-status
pub async fn handle_change_status(
    State(state): State<AppState>,
    AuthCompany(company): AuthCompany,
    body: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let Json(req) = body?;
    let application_id = parse_id("application id", req.id.as_ref())?;
    let status = parse_status(&required_text("status", req.status)?)?;
    let application =
        service::change_status(state.store.as_ref(), company.id, application_id, status).await?;
    Ok(Json(ApplicationResponse { application }))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let application_id = parse_path_id("application id", &raw_id)?;
    let application =
        service::get_application(state.store.as_ref(), &principal, application_id).await?;
    Ok(Json(ApplicationResponse { application }))
}
