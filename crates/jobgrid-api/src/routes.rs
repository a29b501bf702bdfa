//! API routes.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::applications::{apply_to_job, get_applicants, get_applications, update_status};
use crate::handlers::companies::{
    get_companies, get_company_by_id, register_company, update_company,
};
use crate::handlers::jobs::{get_admin_jobs, get_all_jobs, get_job_by_id, post_job, update_job};
use crate::handlers::users::{login, logout, register, update_profile};
use crate::handlers::{health, ready};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let user_routes = Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
        // The profile update is reachable over PUT and POST
        .route("/user/profile/update", put(update_profile).post(update_profile));

    let company_routes = Router::new()
        .route("/company/register", post(register_company))
        .route("/company/get", get(get_companies))
        .route("/company/get/:id", get(get_company_by_id))
        .route("/company/update/:id", put(update_company));

    let job_routes = Router::new()
        .route("/job/post", post(post_job))
        .route("/job/get", get(get_all_jobs))
        .route("/job/admin/jobs", get(get_admin_jobs))
        .route("/job/get/:id", get(get_job_by_id))
        .route("/job/update/:id", put(update_job));

    let application_routes = Router::new()
        .route("/application/apply/:id", post(apply_to_job))
        .route("/application/get", get(get_applications))
        .route("/application/:id/applicants", get(get_applicants))
        .route("/application/status/:id/update", post(update_status));

    let api_routes = Router::new()
        .merge(user_routes)
        .merge(company_routes)
        .merge(job_routes)
        .merge(application_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Bound multipart upload bodies
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
