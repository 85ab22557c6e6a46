use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::auth::AuthCompany;
use crate::companies::service::{self, CompanySession, LoginRequest, RegisterCompany};
use crate::errors::AppError;
use crate::models::company::CompanyProfile;
use crate::multipart::MultipartForm;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CompanyResponse {
    pub company: CompanyProfile,
}

/// POST /api/company/register
pub async fn handle_register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CompanySession>), AppError> {
    let form = MultipartForm::read(multipart).await?;
    let session = service::register(
        state.store.as_ref(),
        state.storage.as_ref(),
        &state.company_tokens,
        RegisterCompany::from_form(form),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/company/login
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<CompanySession>, AppError> {
    let Json(req) = body?;
    let session = service::login(state.store.as_ref(), &state.company_tokens, req).await?;
    Ok(Json(session))
}

/// GET /api/company/company
pub async fn handle_company_profile(
    AuthCompany(company): AuthCompany,
) -> Result<Json<CompanyResponse>, AppError> {
    Ok(Json(CompanyResponse {
        company: company.profile(),
    }))
}
