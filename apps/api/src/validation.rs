//! Boundary parsing for loosely-typed request fields.
//!
//! Browser forms send numbers as strings, so numeric fields accept either
//! representation. Everything that fails here becomes a `Validation` error
//! before any store call is made.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::ApplicationStatus;

/// A JSON number or a string holding one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Text(String),
}

impl Numeric {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

/// Parses a record id. Ids are positive.
pub fn parse_id(field: &str, value: Option<&Numeric>) -> Result<i64, AppError> {
    value
        .and_then(Numeric::as_i64)
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(format!("Invalid {field} provided.")))
}

/// Parses a raw path segment as a record id.
pub fn parse_path_id(field: &str, raw: &str) -> Result<i64, AppError> {
    parse_id(field, Some(&Numeric::Text(raw.to_string())))
}

pub fn parse_salary(value: Option<&Numeric>) -> Result<i64, AppError> {
    let salary = value
        .and_then(Numeric::as_i64)
        .ok_or_else(|| AppError::Validation("salary must be a whole number".to_string()))?;
    if salary < 0 {
        return Err(AppError::Validation(
            "salary must not be negative".to_string(),
        ));
    }
    Ok(salary)
}

/// Returns the trimmed value, rejecting missing or blank input.
pub fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

pub fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(ApplicationStatus::Pending),
        "accepted" => Ok(ApplicationStatus::Accepted),
        "rejected" => Ok(ApplicationStatus::Rejected),
        _ => Err(AppError::Validation(format!(
            "Unknown application status '{raw}'"
        ))),
    }
}
