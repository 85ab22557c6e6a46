pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{applications, companies, identity, jobs, users};

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Public catalog
        .route("/api/jobs", get(jobs::handlers::handle_list_jobs))
        .route("/api/jobs/:id", get(jobs::handlers::handle_get_job))
        // Company accounts
        .route(
            "/api/company/register",
            post(companies::handlers::handle_register),
        )
        .route("/api/company/login", post(companies::handlers::handle_login))
        .route(
            "/api/company/company",
            get(companies::handlers::handle_company_profile),
        )
        .route("/api/company/post-job", post(jobs::handlers::handle_post_job))
        .route(
            "/api/company/list-jobs",
            get(jobs::handlers::handle_list_company_jobs),
        )
        .route(
            "/api/company/change-visibility",
            post(jobs::handlers::handle_change_visibility),
        )
        .route(
            "/api/company/applicants",
            get(applications::handlers::handle_company_applicants),
        )
        .route(
            "/api/company/jobs/:id/applicants",
            get(applications::handlers::handle_job_applicants),
        )
        .route(
            "/api/company/change-status",
            post(applications::handlers::handle_change_status),
        )
        // Job seekers
        .route("/api/users/user", get(users::handlers::handle_get_user))
        .route(
            "/api/users/apply",
            post(applications::handlers::handle_apply),
        )
        .route(
            "/api/users/applications",
            get(applications::handlers::handle_user_applications),
        )
        .route(
            "/api/users/update-resume",
            post(users::handlers::handle_update_resume),
        )
        .route(
            "/api/applications/:id",
            get(applications::handlers::handle_get_application),
        )
        // Identity provider
        .route("/webhooks", post(identity::handlers::handle_webhook))
        .layer(body_limit)
        .with_state(state)
}
