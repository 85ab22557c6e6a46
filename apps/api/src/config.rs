use anyhow::{Context, Result};

const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
const TOKEN_TTL_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL under which uploaded objects are publicly reachable.
    pub s3_public_url: String,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub jwt_secret: String,
    pub company_token_ttl_days: i64,
    pub clerk_secret_key: String,
    pub clerk_webhook_secret: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_public_url: require_env("S3_PUBLIC_URL")?,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            company_token_ttl_days: token_ttl_days(optional_env(
                "COMPANY_TOKEN_TTL_DAYS",
                DEFAULT_TOKEN_TTL_DAYS,
            )?)?,
            clerk_secret_key: require_env("CLERK_SECRET_KEY")?,
            clerk_webhook_secret: require_env("CLERK_WEBHOOK_SECRET")?,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: optional_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn token_ttl_days(days: i64) -> Result<i64> {
    if !TOKEN_TTL_DAYS_RANGE.contains(&days) {
        anyhow::bail!(
            "Environment variable 'COMPANY_TOKEN_TTL_DAYS' must be between {} and {}, got {days}",
            TOKEN_TTL_DAYS_RANGE.start(),
            TOKEN_TTL_DAYS_RANGE.end()
        );
    }
    Ok(days)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
