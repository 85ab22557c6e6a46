use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::User;
use crate::multipart::MultipartForm;
use crate::state::AppState;
use crate::users::service;

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// GET /api/users/user
pub async fn handle_get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = service::get_user(state.store.as_ref(), &user_id).await?;
    Ok(Json(UserResponse { user }))
}

/// POST /api/users/update-resume
pub async fn handle_update_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let user = service::update_resume(
        state.store.as_ref(),
        state.storage.as_ref(),
        &user_id,
        form.take_file("resume"),
    )
    .await?;
    Ok(Json(UserResponse { user }))
}
