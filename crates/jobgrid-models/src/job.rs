//! Job posting models and field normalization.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Salary is either a plain amount or a literal `"min-max"` range string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Salary {
    Amount(f64),
    Range(String),
}

/// Rejection for salary inputs that are neither numeric nor a numeric range.
#[derive(Debug, Error)]
#[error("Salary must be a number or range (e.g., 12 or 50000-70000)")]
pub struct InvalidSalary;

impl Salary {
    /// Parse a salary from its JSON wire value.
    ///
    /// A string containing a hyphen must have numeric sides and is stored
    /// as the trimmed `"min-max"` string. A numeric value (or a string
    /// that parses as one) is stored as a number. Anything else is
    /// rejected.
    pub fn parse(value: &serde_json::Value) -> Result<Self, InvalidSalary> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Salary::Amount).ok_or(InvalidSalary),
            serde_json::Value::String(s) => {
                if let Some((min, max)) = s.split_once('-') {
                    let (min, max) = (min.trim(), max.trim());
                    if min.parse::<f64>().is_ok() && max.parse::<f64>().is_ok() {
                        return Ok(Salary::Range(format!("{}-{}", min, max)));
                    }
                    return Err(InvalidSalary);
                }
                s.trim().parse::<f64>().map(Salary::Amount).map_err(|_| InvalidSalary)
            }
            _ => Err(InvalidSalary),
        }
    }
}

/// A field that arrives either as a list or as a comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StringOrList {
    List(Vec<String>),
    Csv(String),
}

/// Normalize a requirements input to a list: already-a-list passes
/// through, a string is split on commas.
pub fn normalize_requirements(input: StringOrList) -> Vec<String> {
    match input {
        StringOrList::List(items) => items,
        StringOrList::Csv(s) => s.split(',').map(|r| r.to_string()).collect(),
    }
}

/// Job posting stored in the `jobs` collection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ordered requirement list.
    #[serde(default)]
    pub requirements: Vec<String>,
    pub salary: Salary,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
    /// Number of open positions.
    pub position: u32,
    /// Owning company id.
    pub company: String,
    /// Creating user id.
    pub created_by: String,
    /// Application ids, append-only. Kept consistent with each
    /// Application's `job` field by the lifecycle service.
    #[serde(default)]
    pub applications: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job posting with a fresh id and no applications.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        requirements: Vec<String>,
        salary: Salary,
        location: impl Into<String>,
        job_type: impl Into<String>,
        experience_level: impl Into<String>,
        position: u32,
        company: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            requirements,
            salary,
            location: location.into(),
            job_type: job_type.into(),
            experience_level: experience_level.into(),
            position,
            company: company.into(),
            created_by: created_by.into(),
            applications: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive substring match against title, description,
    /// location, or job type.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return true;
        }
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.location.to_lowercase().contains(&needle)
            || self.job_type.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_salary_range_kept_as_string() {
        let salary = Salary::parse(&json!("50000-70000")).unwrap();
        assert_eq!(salary, Salary::Range("50000-70000".to_string()));
    }

    #[test]
    fn test_salary_range_trims_sides() {
        let salary = Salary::parse(&json!("8 - 10")).unwrap();
        assert_eq!(salary, Salary::Range("8-10".to_string()));
    }

    #[test]
    fn test_salary_numeric_string_becomes_number() {
        let salary = Salary::parse(&json!("12")).unwrap();
        assert_eq!(salary, Salary::Amount(12.0));
    }

    #[test]
    fn test_salary_json_number() {
        let salary = Salary::parse(&json!(55000)).unwrap();
        assert_eq!(salary, Salary::Amount(55000.0));
    }

    #[test]
    fn test_salary_rejects_non_numeric() {
        assert!(Salary::parse(&json!("abc")).is_err());
        assert!(Salary::parse(&json!("10-abc")).is_err());
        assert!(Salary::parse(&json!(null)).is_err());
    }

    #[test]
    fn test_requirements_from_csv() {
        let reqs = normalize_requirements(StringOrList::Csv("rust,sql".to_string()));
        assert_eq!(reqs, vec!["rust", "sql"]);
    }

    #[test]
    fn test_requirements_list_passthrough() {
        let reqs = normalize_requirements(StringOrList::List(vec!["rust".to_string()]));
        assert_eq!(reqs, vec!["rust"]);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let job = Job::new(
            "Remote Backend Engineer",
            "Build APIs",
            vec![],
            Salary::Amount(1.0),
            "Pune",
            "full-time",
            "2",
            1,
            "c1",
            "u1",
        );
        assert!(job.matches_keyword("remote"));
        assert!(job.matches_keyword("pune"));
        assert!(job.matches_keyword("FULL-TIME"));
        assert!(!job.matches_keyword("intern"));
        assert!(job.matches_keyword(""));
    }
}
