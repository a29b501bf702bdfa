//! Job posting handlers: create, search, admin listing, detail, update.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use jobgrid_models::{
    normalize_requirements, ApplicantRef, CompanySummary, Job, Salary, StringOrList,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, AppJson};
use crate::services::PopulatedJob;
use crate::state::AppState;

/// A value that arrives as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u32),
    Text(String),
}

impl NumberOrString {
    fn as_u32(&self) -> Option<u32> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostJobRequest {
    #[validate(custom(function = crate::security::non_blank))]
    pub title: String,
    #[validate(custom(function = crate::security::non_blank))]
    pub description: String,
    pub requirements: StringOrList,
    pub salary: serde_json::Value,
    #[validate(custom(function = crate::security::non_blank))]
    pub location: String,
    #[serde(alias = "jobType")]
    #[validate(custom(function = crate::security::non_blank))]
    pub job_type: String,
    #[validate(custom(function = crate::security::non_blank))]
    pub experience: String,
    pub position: NumberOrString,
    #[serde(alias = "companyId")]
    #[validate(custom(function = crate::security::non_blank))]
    pub company_id: String,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub message: String,
    pub success: bool,
    pub job: Job,
}

/// POST /api/v1/job/post
pub async fn post_job(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<PostJobRequest>,
) -> ApiResult<(StatusCode, Json<JobResponse>)> {
    payload
        .validate()
        .map_err(|_| ApiError::validation("Something is missing"))?;

    let requirements = match &payload.requirements {
        StringOrList::Csv(s) if s.trim().is_empty() => {
            return Err(ApiError::validation("Something is missing"))
        }
        other => normalize_requirements(other.clone()),
    };

    let salary = Salary::parse(&payload.salary).map_err(|e| ApiError::validation(e.to_string()))?;

    let position = payload
        .position
        .as_u32()
        .ok_or_else(|| ApiError::validation("Position must be a number"))?;

    let job = Job::new(
        payload.title.trim(),
        payload.description.trim(),
        requirements,
        salary,
        payload.location.trim(),
        payload.job_type.trim(),
        payload.experience.trim(),
        position,
        payload.company_id.trim(),
        &auth.user_id,
    );
    state.jobs().create(&job).await?;

    info!("User {} posted job {}", auth.user_id, job.id);

    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            message: "New job created successfully.".to_string(),
            success: true,
            job,
        }),
    ))
}

/// A job with its company summary, as returned by the listing routes.
#[derive(Serialize)]
pub struct JobListItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary: Salary,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
    pub position: u32,
    pub created_by: String,
    pub applications: Vec<String>,
    pub company: Option<CompanySummary>,
    pub created_at: DateTime<Utc>,
}

impl JobListItem {
    fn new(job: Job, company: Option<CompanySummary>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            requirements: job.requirements,
            salary: job.salary,
            location: job.location,
            job_type: job.job_type,
            experience_level: job.experience_level,
            position: job.position,
            created_by: job.created_by,
            applications: job.applications,
            company,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobSearchQuery {
    pub keyword: Option<String>,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobListItem>,
    pub success: bool,
}

/// GET /api/v1/job/get?keyword=
///
/// The keyword matches case-insensitively as a substring of title,
/// description, location or job type. An empty result is reported as
/// NotFound, matching the source behavior.
pub async fn get_all_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<JobSearchQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let keyword = query.keyword.unwrap_or_default();

    let jobs: Vec<Job> = state
        .jobs()
        .list_newest_first()
        .await?
        .into_iter()
        .filter(|job| job.matches_keyword(&keyword))
        .collect();

    if jobs.is_empty() {
        return Err(ApiError::not_found("No jobs found."));
    }

    let jobs = with_company_summaries(&state, jobs).await?;

    Ok(Json(JobListResponse {
        jobs,
        success: true,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdminJobsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct AdminJobsResponse {
    pub jobs: Vec<JobListItem>,
    pub total_jobs: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub success: bool,
}

/// GET /api/v1/job/admin/jobs?page=&limit=
///
/// The caller's jobs, newest first, page/limit paginated (defaults 1/10).
pub async fn get_admin_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AdminJobsQuery>,
) -> ApiResult<Json<AdminJobsResponse>> {
    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = query.limit.filter(|l| *l > 0).unwrap_or(10);
    let offset = (page - 1).saturating_mul(limit);

    let repo = state.jobs();
    let jobs = repo.list_by_creator(&auth.user_id, offset, limit).await?;
    let total_jobs = repo.count_by_creator(&auth.user_id).await?;

    let jobs = with_company_summaries(&state, jobs).await?;

    Ok(Json(AdminJobsResponse {
        jobs,
        total_jobs,
        current_page: page,
        total_pages: total_pages(total_jobs, limit),
        success: true,
    }))
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: PopulatedJob<ApplicantRef>,
    pub success: bool,
}

/// GET /api/v1/job/get/:id
///
/// The job with its company populated and its applications resolved to
/// applicant projections, newest first.
pub async fn get_job_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobDetailResponse>> {
    let job = state
        .lifecycle()
        .populated_job(&job_id, jobgrid_models::User::applicant_ref)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found."))?;

    Ok(Json(JobDetailResponse {
        job,
        success: true,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<StringOrList>,
    pub salary: Option<serde_json::Value>,
    pub location: Option<String>,
    #[serde(alias = "jobType")]
    pub job_type: Option<String>,
    pub experience: Option<String>,
    pub position: Option<NumberOrString>,
    #[serde(alias = "companyId")]
    pub company_id: Option<String>,
}

/// PUT /api/v1/job/update/:id
///
/// Restricted to the job's creator. Omitted or blank fields keep their
/// prior values; requirements and salary re-normalize as in create.
pub async fn update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
    AppJson(payload): AppJson<UpdateJobRequest>,
) -> ApiResult<Json<JobResponse>> {
    let repo = state.jobs();
    let mut job = repo
        .get(&job_id)
        .await?
        .filter(|job| job.created_by == auth.user_id)
        .ok_or_else(|| ApiError::not_found("Job not found or not authorized"))?;

    if let Some(title) = nonblank(payload.title) {
        job.title = title;
    }
    if let Some(description) = nonblank(payload.description) {
        job.description = description;
    }
    if let Some(requirements) = payload.requirements {
        match requirements {
            StringOrList::Csv(ref s) if s.trim().is_empty() => {}
            other => job.requirements = normalize_requirements(other),
        }
    }
    if let Some(salary) = payload.salary.filter(|v| !v.is_null()) {
        job.salary = Salary::parse(&salary).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    if let Some(location) = nonblank(payload.location) {
        job.location = location;
    }
    if let Some(job_type) = nonblank(payload.job_type) {
        job.job_type = job_type;
    }
    if let Some(experience) = nonblank(payload.experience) {
        job.experience_level = experience;
    }
    if let Some(position) = payload.position.as_ref().and_then(NumberOrString::as_u32) {
        job.position = position;
    }
    if let Some(company_id) = nonblank(payload.company_id) {
        job.company = company_id;
    }

    job.updated_at = Utc::now();
    repo.update(&job).await?;

    Ok(Json(JobResponse {
        message: "Job updated successfully".to_string(),
        success: true,
        job,
    }))
}

/// Resolve company summaries for a page of jobs.
async fn with_company_summaries(
    state: &AppState,
    jobs: Vec<Job>,
) -> ApiResult<Vec<JobListItem>> {
    let company_ids: Vec<String> = jobs.iter().map(|j| j.company.clone()).collect();
    let companies = state.companies().get_many(&company_ids).await?;

    Ok(jobs
        .into_iter()
        .map(|job| {
            let company = companies.get(&job.company).map(|c| c.summary());
            JobListItem::new(job, company)
        })
        .collect())
}

/// Page count for a total and page size: `ceil(total / limit)`.
fn total_pages(total: u32, limit: u32) -> u32 {
    total.div_ceil(limit)
}

fn nonblank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn test_number_or_string_parsing() {
        assert_eq!(NumberOrString::Number(3).as_u32(), Some(3));
        assert_eq!(NumberOrString::Text("4".to_string()).as_u32(), Some(4));
        assert_eq!(NumberOrString::Text("four".to_string()).as_u32(), None);
    }

    #[test]
    fn test_post_job_request_accepts_camel_case_aliases() {
        let payload: PostJobRequest = serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "description": "Build APIs",
            "requirements": "rust,sql",
            "salary": "50000-70000",
            "location": "Remote",
            "jobType": "full-time",
            "experience": "2 years",
            "position": "3",
            "companyId": "company-1"
        }))
        .unwrap();

        assert_eq!(payload.job_type, "full-time");
        assert_eq!(payload.company_id, "company-1");
        assert_eq!(payload.position.as_u32(), Some(3));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_post_job_request_rejects_blank_title() {
        let payload: PostJobRequest = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "description": "Build APIs",
            "requirements": ["rust"],
            "salary": 12,
            "location": "Remote",
            "job_type": "full-time",
            "experience": "2 years",
            "position": 1,
            "company_id": "company-1"
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }
}
