use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthCompany, CatalogReader};
use crate::errors::AppError;
use crate::jobs::service::{self, PostJobRequest};
use crate::models::job::{Job, JobWithApplicants, JobWithCompany};
use crate::state::AppState;
use crate::validation::{parse_id, parse_path_id, Numeric};

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobWithCompany>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: JobWithCompany,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Serialize)]
pub struct CompanyJobsResponse {
    pub jobs: Vec<JobWithApplicants>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    pub id: Option<Numeric>,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    CatalogReader(principal): CatalogReader,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = service::list_visible_jobs(state.store.as_ref(), &principal).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    CatalogReader(principal): CatalogReader,
    Path(raw_id): Path<String>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job_id = parse_path_id("job id", &raw_id)?;
    let job = service::get_job(state.store.as_ref(), &principal, job_id).await?;
    Ok(Json(JobDetailResponse { job }))
}

/// POST /api/company/post-job
pub async fn handle_post_job(
    State(state): State<AppState>,
    AuthCompany(company): AuthCompany,
    body: Result<Json<PostJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    let Json(req) = body?;
    let job = service::post_job(state.store.as_ref(), &company, req).await?;
    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

/// GET /api/company/list-jobs
pub async fn handle_list_company_jobs(
    State(state): State<AppState>,
    AuthCompany(company): AuthCompany,
) -> Result<Json<CompanyJobsResponse>, AppError> {
    let jobs = service::list_company_jobs(state.store.as_ref(), &company).await?;
    Ok(Json(CompanyJobsResponse { jobs }))
}

/// POST /api/company/change-visibility
pub async fn handle_change_visibility(
    State(state): State<AppState>,
    AuthCompany(company): AuthCompany,
    body: Result<Json<VisibilityRequest>, JsonRejection>,
) -> Result<Json<JobResponse>, AppError> {
    let Json(req) = body?;
    let job_id = parse_id("job id", req.id.as_ref())?;
    let job = service::toggle_visibility(state.store.as_ref(), &company, job_id).await?;
    Ok(Json(JobResponse { job }))
}
