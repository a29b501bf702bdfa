//! Application handlers: apply, own applications, applicants, status.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use jobgrid_models::{ApplicantRef, PublicUser};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, AppJson};
use crate::services::{ApplicationWithJob, PopulatedJob};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ApplyResponse {
    pub message: String,
    pub success: bool,
    pub job: PopulatedJob<ApplicantRef>,
}

/// POST /api/v1/application/apply/:id
pub async fn apply_to_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<(StatusCode, Json<ApplyResponse>)> {
    let job = state
        .lifecycle()
        .apply_to_job(&job_id, &auth.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            message: "Job applied successfully.".to_string(),
            success: true,
            job,
        }),
    ))
}

/// The response keeps the source's singular `application` key.
#[derive(Serialize)]
pub struct ApplicationListResponse {
    pub application: Vec<ApplicationWithJob>,
    pub success: bool,
}

/// GET /api/v1/application/get
pub async fn get_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApplicationListResponse>> {
    let application = state
        .lifecycle()
        .applications_for_user(&auth.user_id)
        .await?;

    Ok(Json(ApplicationListResponse {
        application,
        success: true,
    }))
}

#[derive(Serialize)]
pub struct ApplicantsResponse {
    pub job: PopulatedJob<PublicUser>,
    pub success: bool,
}

/// GET /api/v1/application/:id/applicants
///
/// Any authenticated user may list a job's applicants; there is no
/// ownership check here.
pub async fn get_applicants(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ApplicantsResponse>> {
    let job = state.lifecycle().applicants_for_job(&job_id).await?;

    Ok(Json(ApplicantsResponse {
        job,
        success: true,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub message: String,
    pub success: bool,
}

/// POST /api/v1/application/status/:id/update
///
/// Status must parse into the closed pending/accepted/rejected set
/// after lowercasing. No ownership check ties the caller to the job
/// owner.
pub async fn update_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(application_id): Path<String>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let status = payload
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Status is required"))?;

    state
        .lifecycle()
        .update_status(&application_id, status)
        .await?;

    Ok(Json(StatusUpdateResponse {
        message: "Status updated successfully.".to_string(),
        success: true,
    }))
}
