use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::CompanyTokens;
use crate::errors::AppError;
use crate::models::company::{CompanyProfile, NewCompany};
use crate::multipart::MultipartForm;
use crate::storage::{FileStorage, Upload};
use crate::store::Store;
use crate::validation::required_text;

pub const LOGO_FOLDER: &str = "logos";
const MIN_PASSWORD_LEN: usize = 8;
const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default)]
pub struct RegisterCompany {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<Upload>,
}

impl RegisterCompany {
    pub fn from_form(mut form: MultipartForm) -> Self {
        RegisterCompany {
            name: form.take_text("name"),
            email: form.take_text("email"),
            password: form.take_text("password"),
            image: form.take_file("image"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A company profile paired with a freshly issued bearer token.
#[derive(Debug, Serialize)]
pub struct CompanySession {
    pub company: CompanyProfile,
    pub token: String,
}

fn normalize_email(raw: Option<String>) -> Result<String, AppError> {
    let email = required_text("email", raw)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation("email is invalid".to_string())),
    }
}

/// Creates a company account. The logo is uploaded only after every other
/// check has passed, so rejected registrations leave nothing in the bucket.
pub async fn register(
    store: &dyn Store,
    storage: &dyn FileStorage,
    tokens: &CompanyTokens,
    input: RegisterCompany,
) -> Result<CompanySession, AppError> {
    let name = required_text("name", input.name)?;
    let email = normalize_email(input.email)?;
    let password = input
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let image = input
        .image
        .ok_or_else(|| AppError::Validation("Company logo is required".to_string()))?;

    if store.find_company_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "Company with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(password).await?;
    let image = storage.upload(LOGO_FOLDER, image).await?;

    let company = store
        .create_company(NewCompany {
            name,
            email,
            password_hash,
            image,
        })
        .await?;
    info!("Company registered: {} ({})", company.id, company.email);

    Ok(CompanySession {
        token: tokens.issue(company.id).map_err(anyhow::Error::from)?,
        company: company.profile(),
    })
}

/// Unknown email and wrong password produce the same error.
pub async fn login(
    store: &dyn Store,
    tokens: &CompanyTokens,
    request: LoginRequest,
) -> Result<CompanySession, AppError> {
    let rejected = || AppError::Unauthenticated(BAD_CREDENTIALS.to_string());

    let email = request
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(rejected)?;
    let password = request.password.filter(|p| !p.is_empty()).ok_or_else(rejected)?;

    let company = store
        .find_company_by_email(&email)
        .await?
        .ok_or_else(rejected)?;
    if !verify_password(password, company.password_hash.clone()).await? {
        return Err(rejected());
    }

    info!("Company logged in: {}", company.id);
    Ok(CompanySession {
        token: tokens.issue(company.id).map_err(anyhow::Error::from)?,
        company: company.profile(),
    })
}
