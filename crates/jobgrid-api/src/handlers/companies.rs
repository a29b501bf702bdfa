//! Company handlers: register, list, get, update.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use jobgrid_models::Company;
use jobgrid_storage::MediaFolder;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::forms::FormData;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CompanyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub success: bool,
    pub company: Company,
}

#[derive(Serialize)]
pub struct CompanyListResponse {
    pub success: bool,
    pub companies: Vec<Company>,
}

/// POST /api/v1/company/register
///
/// Company names are unique across the system; the caller becomes the
/// immutable owner. An optional `logo` file is uploaded to the media
/// bucket.
pub async fn register_company(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CompanyResponse>)> {
    let form = FormData::read(multipart).await?;

    let name = form
        .text("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Company name is required."))?;

    let companies = state.companies();
    if companies.find_by_name(name).await?.is_some() {
        return Err(ApiError::duplicate("Company already exists."));
    }

    let logo = match form.file("logo") {
        Some(file) => Some(
            state
                .media
                .upload(
                    MediaFolder::CompanyLogos,
                    &file.filename,
                    file.content_type.as_deref(),
                    file.data.clone(),
                )
                .await?
                .url,
        ),
        None => None,
    };

    let company = Company::new(name, &auth.user_id, logo);
    companies.create(&company).await?;

    info!("Registered company {} for user {}", company.id, auth.user_id);

    Ok((
        StatusCode::CREATED,
        Json(CompanyResponse {
            message: Some("Company registered successfully.".to_string()),
            success: true,
            company,
        }),
    ))
}

/// GET /api/v1/company/get
///
/// The caller's companies. An empty list is reported as NotFound,
/// matching the source behavior.
pub async fn get_companies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CompanyListResponse>> {
    let companies = state.companies().list_by_owner(&auth.user_id).await?;
    if companies.is_empty() {
        return Err(ApiError::not_found("No companies found."));
    }

    Ok(Json(CompanyListResponse {
        success: true,
        companies,
    }))
}

/// GET /api/v1/company/get/:id
pub async fn get_company_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<String>,
) -> ApiResult<Json<CompanyResponse>> {
    let company = state
        .companies()
        .get(&company_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    Ok(Json(CompanyResponse {
        message: None,
        success: true,
        company,
    }))
}

/// PUT /api/v1/company/update/:id
///
/// Omitted fields keep their prior values; the logo is replaced only
/// when a new file is supplied.
pub async fn update_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<CompanyResponse>> {
    let form = FormData::read(multipart).await?;

    let companies = state.companies();
    let mut company = companies
        .get(&company_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    if let Some(name) = nonempty(form.text("name")) {
        company.name = name;
    }
    if let Some(description) = nonempty(form.text("description")) {
        company.description = Some(description);
    }
    if let Some(website) = nonempty(form.text("website")) {
        company.website = Some(website);
    }
    if let Some(location) = nonempty(form.text("location")) {
        company.location = Some(location);
    }

    if let Some(file) = form.file("logo") {
        let uploaded = state
            .media
            .upload(
                MediaFolder::CompanyLogos,
                &file.filename,
                file.content_type.as_deref(),
                file.data.clone(),
            )
            .await?;
        company.logo = Some(uploaded.url);
    }

    company.updated_at = chrono::Utc::now();
    companies.update(&company).await?;

    Ok(Json(CompanyResponse {
        message: Some("Company updated successfully".to_string()),
        success: true,
        company,
    }))
}

fn nonempty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
