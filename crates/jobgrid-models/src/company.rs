//! Company models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Company stored in the `companies` collection.
///
/// `user_id` is the owning recruiter and is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Company {
    pub id: String,
    /// Unique across the system, enforced at write time.
    pub name: String,
    /// Owning user id.
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company record with a fresh id.
    pub fn new(
        name: impl Into<String>,
        user_id: impl Into<String>,
        logo: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            user_id: user_id.into(),
            description: None,
            website: None,
            location: None,
            logo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Summary projection used when populating job listings.
    pub fn summary(&self) -> CompanySummary {
        CompanySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            logo: self.logo.clone(),
        }
    }
}

/// Company projection attached to job search results (name/location/logo).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}
