//! Job application models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Application status. Closed set: unrecognized values are rejected at
/// the boundary instead of being stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Parse from string after lowercasing. Returns `None` for anything
    /// outside the status set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job application stored in the `applications` collection.
///
/// Created exactly once per (job, applicant) pair; the id is mirrored in
/// the referenced Job's `applications` list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Application {
    pub id: String,
    /// Referenced job id.
    pub job: String,
    /// Applicant user id.
    pub applicant: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Create a new pending application with a fresh id.
    pub fn new(job: impl Into<String>, applicant: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            job: job.into(),
            applicant: applicant.into(),
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_normalizes_case() {
        assert_eq!(ApplicationStatus::parse("Accepted"), Some(ApplicationStatus::Accepted));
        assert_eq!(ApplicationStatus::parse(" REJECTED "), Some(ApplicationStatus::Rejected));
        assert_eq!(ApplicationStatus::parse("pending"), Some(ApplicationStatus::Pending));
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(ApplicationStatus::parse("shortlisted"), None);
        assert_eq!(ApplicationStatus::parse(""), None);
    }

    #[test]
    fn test_new_application_is_pending() {
        let app = Application::new("job-1", "user-1");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.job, "job-1");
        assert_eq!(app.applicant, "user-1");
    }
}
