//! Job applications: submission, listings and the hiring decision.

pub mod handlers;
pub mod lifecycle;
pub mod service;
