//! User account models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role. Only these two roles exist; anything else is rejected
/// at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Recruiter,
}

impl Role {
    /// Parse from string (case-insensitive). Returns `None` for
    /// unrecognized roles.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "recruiter" => Some(Role::Recruiter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Recruiter => "recruiter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Profile data nested under a user document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    /// Short free-text bio.
    #[serde(default)]
    pub bio: String,

    /// Skill list, normalized to trimmed non-empty strings.
    #[serde(default)]
    pub skills: Vec<String>,

    /// Public URL of the uploaded resume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,

    /// Original filename of the uploaded resume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_original_name: Option<String>,

    /// Public URL of the profile photo. Required at registration.
    #[serde(default)]
    pub profile_photo: String,
}

/// User account stored in the `users` collection.
///
/// The password hash never leaves the backend; responses use
/// [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with a fresh id.
    pub fn new(
        fullname: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        profile_photo: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            fullname: fullname.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            password: password_hash.into(),
            role,
            profile: Profile {
                profile_photo: profile_photo.into(),
                ..Profile::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Public projection without the password hash.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            fullname: self.fullname.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            role: self.role,
            profile: self.profile.clone(),
            created_at: self.created_at,
        }
    }

    /// Minimal projection used when populating a job's applicants.
    pub fn applicant_ref(&self) -> ApplicantRef {
        ApplicantRef {
            id: self.id.clone(),
            fullname: self.fullname.clone(),
            email: self.email.clone(),
            resume: self.profile.resume.clone(),
        }
    }
}

/// User projection safe to return in responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PublicUser {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

/// Minimal applicant projection (id, fullname, email, resume).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApplicantRef {
    pub id: String,
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
}

/// Normalize a skills input to a list of trimmed non-empty strings.
///
/// Accepts a JSON-encoded string array (`'["a","b"]'`) or a
/// comma-separated string (`"a, b, c"`).
pub fn parse_skills(input: &str) -> Vec<String> {
    if let Ok(parsed) = serde_json::from_str::<Vec<String>>(input) {
        return parsed
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("Recruiter"), Some(Role::Recruiter));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_skills_from_csv() {
        assert_eq!(parse_skills("a, b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_skills_from_json() {
        assert_eq!(parse_skills(r#"["rust", " sql "]"#), vec!["rust", "sql"]);
    }

    #[test]
    fn test_skills_drops_empty_entries() {
        assert_eq!(parse_skills("a,,b,"), vec!["a", "b"]);
    }

    #[test]
    fn test_password_never_serialized() {
        let user = User::new("Jane Doe", "jane@example.com", "12345", "$argon2$hash", Role::Student, "https://cdn/p.png");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }
}
