use tracing::info;

use crate::errors::AppError;
use crate::models::user::User;
use crate::storage::{FileStorage, Upload};
use crate::store::Store;

pub const RESUME_FOLDER: &str = "resumes";

pub async fn get_user(store: &dyn Store, user_id: &str) -> Result<User, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))
}

/// Uploads a new resume and points the user's profile at it. The previous
/// object is left in the bucket.
pub async fn update_resume(
    store: &dyn Store,
    storage: &dyn FileStorage,
    user_id: &str,
    resume: Option<Upload>,
) -> Result<User, AppError> {
    let resume = resume.ok_or_else(|| AppError::Validation("Resume file is required".to_string()))?;
    let user = get_user(store, user_id).await?;

    let url = storage.upload(RESUME_FOLDER, resume).await?;
    let updated = store.set_user_resume(&user.id, &url).await?;
    info!("Resume updated for user {}", updated.id);
    Ok(updated)
}
