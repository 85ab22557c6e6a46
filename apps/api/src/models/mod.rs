pub mod application;
pub mod company;
pub mod job;
pub mod user;

/// Store-assigned identifiers. Users are keyed by the identity provider's id.
pub type CompanyId = i64;
pub type JobId = i64;
pub type ApplicationId = i64;
pub type UserId = String;
