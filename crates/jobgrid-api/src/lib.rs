//! Axum HTTP API server.
//!
//! This crate provides:
//! - REST endpoints for users, companies, jobs and applications
//! - Cookie-borne HS256 identity tokens
//! - The application lifecycle service (uniqueness + Job↔Application
//!   cross-reference consistency)
//! - Security headers, request logging and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::ApplicationLifecycle;
pub use state::AppState;
