//! User account handlers: register, login, logout, profile update.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use jobgrid_models::{parse_skills, PublicUser, Role, User};
use jobgrid_storage::MediaFolder;

use crate::auth::{auth_cookie, clear_auth_cookie, issue_token, AuthUser};
use crate::error::{ApiError, ApiResult, AppJson};
use crate::forms::FormData;
use crate::security::{hash_password, verify_password};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UserResponse {
    pub message: String,
    pub success: bool,
    pub user: PublicUser,
}

/// POST /api/v1/user/register
///
/// Multipart form: fullname, email, phone number, password, role, plus a
/// required `profilePhoto` file. Rejects when an existing user shares
/// the email or the fullname.
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let form = FormData::read(multipart).await?;

    let fullname = required(&form, &["fullname"])?;
    let email = required(&form, &["email"])?;
    let phone_number = required(&form, &["phone_number", "phoneNumber"])?;
    let password = required(&form, &["password"])?;
    let role = Role::parse(required(&form, &["role"])?.as_str())
        .ok_or_else(|| ApiError::validation("Role must be student or recruiter"))?;

    let users = state.users();
    let exists = users.find_by_email(&email).await?.is_some()
        || users.find_by_fullname(&fullname).await?.is_some();
    if exists {
        return Err(ApiError::duplicate(
            "User with same email or fullname already exists",
        ));
    }

    let photo = form
        .file("profilePhoto")
        .ok_or_else(|| ApiError::validation("Profile photo is required"))?;
    let uploaded = state
        .media
        .upload(
            MediaFolder::Avatars,
            &photo.filename,
            photo.content_type.as_deref(),
            photo.data.clone(),
        )
        .await?;

    let password_hash = hash_password(&password)?;
    let user = User::new(fullname, email, phone_number, password_hash, role, uploaded.url);
    users.create(&user).await?;

    info!("Registered {} account {}", role, user.id);

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "Account created".to_string(),
            success: true,
            user: user.public(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// POST /api/v1/user/login
///
/// The supplied role must match the stored role exactly; correct
/// credentials with the wrong role are rejected.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<UserResponse>)> {
    let (email, password, role) = match (&payload.email, &payload.password, &payload.role) {
        (Some(email), Some(password), Some(role))
            if !email.is_empty() && !password.is_empty() && !role.is_empty() =>
        {
            (email, password, role)
        }
        _ => return Err(ApiError::validation("All fields required")),
    };

    let user = state
        .users()
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Incorrect email or password"))?;

    if !verify_password(&user.password, password)? {
        return Err(ApiError::bad_request("Incorrect email or password"));
    }

    // Correct credentials with the wrong role are still rejected
    if !role_matches(role, user.role) {
        return Err(ApiError::bad_request("Role mismatch"));
    }

    let token = issue_token(&user.id, &state.config.jwt_secret, state.config.token_ttl_secs)?;
    let jar = jar.add(auth_cookie(token, state.config.token_ttl_secs));

    Ok((
        jar,
        Json(UserResponse {
            message: format!("Welcome back {}", user.fullname),
            success: true,
            user: user.public(),
        }),
    ))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

/// POST /api/v1/user/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(clear_auth_cookie()),
        Json(MessageResponse {
            message: "Logged out".to_string(),
            success: true,
        }),
    )
}

/// PUT|POST /api/v1/user/profile/update
///
/// Partial multipart update. Skills arrive as a JSON-encoded array, a
/// comma-separated string, or repeated list entries; optional new
/// profile photo and resume files replace the stored URLs.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<UserResponse>> {
    let form = FormData::read(multipart).await?;

    let users = state.users();
    let mut user = users
        .get(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    if let Some(fullname) = nonempty(form.text("fullname")) {
        user.fullname = fullname;
    }
    if let Some(email) = nonempty(form.text("email")) {
        user.email = email;
    }
    if let Some(phone) = nonempty(form.text_any(&["phone_number", "phoneNumber"])) {
        user.phone_number = phone;
    }
    if let Some(bio) = form.text("bio") {
        user.profile.bio = bio.to_string();
    }
    if let Some(skills) = nonempty(form.text("skills")) {
        user.profile.skills = parse_skills(&skills);
    }

    if let Some(photo) = form.file("profilePhoto") {
        let uploaded = state
            .media
            .upload(
                MediaFolder::Avatars,
                &photo.filename,
                photo.content_type.as_deref(),
                photo.data.clone(),
            )
            .await?;
        user.profile.profile_photo = uploaded.url;
    }

    if let Some(resume) = form.file("resume") {
        let uploaded = state
            .media
            .upload(
                MediaFolder::Resumes,
                &resume.filename,
                resume.content_type.as_deref(),
                resume.data.clone(),
            )
            .await?;
        user.profile.resume = Some(uploaded.url);
        user.profile.resume_original_name = Some(uploaded.original_name);
    }

    user.updated_at = chrono::Utc::now();
    users.update(&user).await?;

    Ok(Json(UserResponse {
        message: "Profile updated".to_string(),
        success: true,
        user: user.public(),
    }))
}

fn required(form: &FormData, names: &[&str]) -> Result<String, ApiError> {
    match form.text_any(names).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::validation("All fields required")),
    }
}

fn nonempty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn role_matches(supplied: &str, stored: Role) -> bool {
    Role::parse(supplied) == Some(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mismatch_is_rejected() {
        assert!(role_matches("student", Role::Student));
        assert!(role_matches("Recruiter", Role::Recruiter));
        assert!(!role_matches("recruiter", Role::Student));
        assert!(!role_matches("admin", Role::Student));
    }
}

