//! Application lifecycle service.
//!
//! Owns the two consistency rules of the apply flow:
//! - at most one Application per (job, applicant) pair
//! - every Application id appears in exactly one Job's `applications`
//!   list, and that Application references the Job back
//!
//! The insert and the cross-reference update travel in one atomic batch
//! write guarded by preconditions; contention re-runs the duplicate
//! check before retrying, so concurrent applies for the same pair cannot
//! both land.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use jobgrid_firestore::{
    ApplicationRepository, CompanyRepository, FirestoreClient, FirestoreError, JobRepository,
    UserRepository,
};
use jobgrid_models::{
    ApplicantRef, Application, ApplicationStatus, Company, Job, PublicUser, Salary, User,
};

use crate::error::{ApiError, ApiResult};

/// Maximum attempts for the guarded apply write under contention.
const MAX_APPLY_RETRIES: u32 = 5;

/// An application resolved with its applicant projection.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedApplication<A> {
    pub id: String,
    pub job: String,
    /// `None` when the applicant account can no longer be resolved.
    pub applicant: Option<A>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// A job with its company and applications resolved, newest application
/// first.
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedJob<A> {
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
    pub company: Option<Company>,
    pub applications: Vec<ResolvedApplication<A>>,
    pub created_at: DateTime<Utc>,
}

/// A job with only its company resolved (applications stay ids).
#[derive(Debug, Clone, Serialize)]
pub struct JobWithCompany {
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
    pub company: Option<Company>,
    pub created_at: DateTime<Utc>,
}

impl JobWithCompany {
    fn new(job: Job, company: Option<Company>) -> Self {
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

/// A caller's application resolved with its job and that job's company.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithJob {
    pub id: String,
    pub applicant: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    /// `None` when the referenced job no longer resolves.
    pub job: Option<JobWithCompany>,
}

/// Service enforcing application uniqueness and the Job↔Application
/// cross-reference.
pub struct ApplicationLifecycle {
    users: UserRepository,
    companies: CompanyRepository,
    jobs: JobRepository,
    applications: ApplicationRepository,
}

impl ApplicationLifecycle {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            users: UserRepository::new(client.clone()),
            companies: CompanyRepository::new(client.clone()),
            jobs: JobRepository::new(client.clone()),
            applications: ApplicationRepository::new(client),
        }
    }

    /// Apply the caller to a job.
    ///
    /// Returns the job with its applications populated (newest first,
    /// applicants projected to id/fullname/email/resume).
    pub async fn apply_to_job(
        &self,
        job_id: &str,
        applicant_id: &str,
    ) -> ApiResult<PopulatedJob<ApplicantRef>> {
        for attempt in 0..MAX_APPLY_RETRIES {
            // The duplicate check runs inside the retry loop: a writer
            // that loses the precondition race re-reads and finds the
            // winner's application here.
            if self
                .applications
                .find_by_job_and_applicant(job_id, applicant_id)
                .await?
                .is_some()
            {
                return Err(ApiError::duplicate("You have already applied for this job."));
            }

            let (job, update_time) = self
                .jobs
                .get_with_update_time(job_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Job not found"))?;

            let application = Application::new(job_id, applicant_id);

            match self
                .applications
                .create_linked(&application, &job, update_time.as_deref())
                .await
            {
                Ok(()) => {
                    info!(
                        "User {} applied to job {} (application {})",
                        applicant_id, job_id, application.id
                    );
                    return self
                        .populated_job(job_id, User::applicant_ref)
                        .await?
                        .ok_or_else(|| ApiError::not_found("Job not found"));
                }
                Err(e) if e.is_precondition_failed() && attempt + 1 < MAX_APPLY_RETRIES => {
                    debug!(
                        "Apply contention on job {} (attempt {}), retrying",
                        job_id,
                        attempt + 1
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(
                        50 * (attempt as u64 + 1),
                    ))
                    .await;
                }
                Err(FirestoreError::AlreadyExists(_)) => {
                    return Err(ApiError::duplicate("You have already applied for this job."));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::internal(format!(
            "Apply to job {} failed after {} attempts",
            job_id, MAX_APPLY_RETRIES
        )))
    }

    /// All applications of a user, newest first, each resolved to its
    /// job and that job's company.
    ///
    /// An empty result is reported as NotFound, matching the source
    /// behavior.
    pub async fn applications_for_user(
        &self,
        applicant_id: &str,
    ) -> ApiResult<Vec<ApplicationWithJob>> {
        let applications = self.applications.list_by_applicant(applicant_id).await?;
        if applications.is_empty() {
            return Err(ApiError::not_found("No Applications."));
        }

        let job_ids: Vec<String> = applications.iter().map(|a| a.job.clone()).collect();
        let jobs = self.jobs.get_many(&job_ids).await?;

        let company_ids: Vec<String> = jobs.values().map(|j| j.company.clone()).collect();
        let companies = self.companies.get_many(&company_ids).await?;

        Ok(Self::join_applications(applications, jobs, companies))
    }

    /// The job with each application resolved to the applicant's full
    /// public profile, newest first.
    ///
    /// No ownership check ties the caller to the job owner; any
    /// authenticated user may list applicants.
    pub async fn applicants_for_job(&self, job_id: &str) -> ApiResult<PopulatedJob<PublicUser>> {
        self.populated_job(job_id, User::public)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))
    }

    /// Set an application's status. Input is lowercased and must parse
    /// into the closed status set.
    pub async fn update_status(&self, application_id: &str, status: &str) -> ApiResult<()> {
        let status = ApplicationStatus::parse(status).ok_or_else(|| {
            ApiError::validation("Status must be one of pending, accepted, rejected")
        })?;

        if self.applications.get(application_id).await?.is_none() {
            return Err(ApiError::not_found("Application not found"));
        }

        self.applications.update_status(application_id, status).await?;
        Ok(())
    }

    /// Resolve a job with company and applications, projecting each
    /// applicant through `project`.
    pub async fn populated_job<A>(
        &self,
        job_id: &str,
        project: impl Fn(&User) -> A,
    ) -> ApiResult<Option<PopulatedJob<A>>> {
        let job = match self.jobs.get(job_id).await? {
            Some(job) => job,
            None => return Ok(None),
        };

        let company = self.companies.get(&job.company).await?;

        let mut applications = self.applications.get_many(&job.applications).await?;
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let applicant_ids: Vec<String> =
            applications.iter().map(|a| a.applicant.clone()).collect();
        let applicants = self.users.get_many(&applicant_ids).await?;

        let applications = applications
            .into_iter()
            .map(|application| ResolvedApplication {
                applicant: applicants.get(&application.applicant).map(&project),
                id: application.id,
                job: application.job,
                status: application.status,
                created_at: application.created_at,
            })
            .collect();

        Ok(Some(PopulatedJob {
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
            company,
            applications,
            created_at: job.created_at,
        }))
    }

    /// Assemble the per-user application view from already-fetched parts.
    fn join_applications(
        applications: Vec<Application>,
        jobs: HashMap<String, Job>,
        companies: HashMap<String, Company>,
    ) -> Vec<ApplicationWithJob> {
        applications
            .into_iter()
            .map(|application| {
                let job = jobs.get(&application.job).cloned().map(|job| {
                    let company = companies.get(&job.company).cloned();
                    JobWithCompany::new(job, company)
                });
                ApplicationWithJob {
                    id: application.id,
                    applicant: application.applicant,
                    status: application.status,
                    created_at: application.created_at,
                    job,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(company_id: &str) -> Job {
        Job::new(
            "Backend Engineer",
            "Build the API",
            vec!["rust".to_string()],
            Salary::Amount(50_000.0),
            "Remote",
            "full-time",
            "2 years",
            1,
            company_id,
            "recruiter-1",
        )
    }

    #[test]
    fn test_join_resolves_job_and_company() {
        let company = Company::new("Acme", "recruiter-1", None);
        let job = sample_job(&company.id);
        let application = Application::new(&job.id, "student-1");

        let mut jobs = HashMap::new();
        jobs.insert(job.id.clone(), job.clone());
        let mut companies = HashMap::new();
        companies.insert(company.id.clone(), company.clone());

        let joined =
            ApplicationLifecycle::join_applications(vec![application.clone()], jobs, companies);

        assert_eq!(joined.len(), 1);
        let resolved_job = joined[0].job.as_ref().expect("job resolved");
        assert_eq!(resolved_job.id, job.id);
        assert_eq!(
            resolved_job.company.as_ref().map(|c| c.name.as_str()),
            Some("Acme")
        );
        assert_eq!(joined[0].status, ApplicationStatus::Pending);
    }

    #[test]
    fn test_join_tolerates_missing_job() {
        let application = Application::new("gone-job", "student-1");
        let joined = ApplicationLifecycle::join_applications(
            vec![application],
            HashMap::new(),
            HashMap::new(),
        );
        assert_eq!(joined.len(), 1);
        assert!(joined[0].job.is_none());
    }

    mod apply_flow {
        use super::*;
        use std::time::Duration;

        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use jobgrid_firestore::client::FirestoreConfig;
        use jobgrid_firestore::retry::RetryConfig;

        const RUN_QUERY: &str =
            "/v1/projects/test-project/databases/(default)/documents:runQuery";

        async fn lifecycle(server: &MockServer) -> ApplicationLifecycle {
            let config = FirestoreConfig {
                project_id: "test-project".to_string(),
                database_id: "(default)".to_string(),
                timeout: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(2),
                retry: RetryConfig {
                    max_retries: 0,
                    base_delay_ms: 1,
                    max_delay_ms: 10,
                },
                emulator_host: Some(server.uri()),
            };
            let client = FirestoreClient::new(config).await.expect("client");
            ApplicationLifecycle::new(client)
        }

        #[tokio::test]
        async fn test_second_apply_for_same_pair_is_rejected() {
            let server = MockServer::start().await;

            // The (job, applicant) duplicate query finds an existing record
            Mock::given(method("POST"))
                .and(path(RUN_QUERY))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                    {
                        "document": {
                            "name": "projects/test-project/databases/(default)/documents/applications/a1",
                            "fields": {
                                "id": { "stringValue": "a1" },
                                "job": { "stringValue": "j1" },
                                "applicant": { "stringValue": "u1" },
                                "status": { "stringValue": "pending" },
                                "created_at": { "timestampValue": "2024-01-01T00:00:00Z" },
                                "updated_at": { "timestampValue": "2024-01-01T00:00:00Z" }
                            }
                        }
                    }
                ])))
                .mount(&server)
                .await;

            let lifecycle = lifecycle(&server).await;
            let result = lifecycle.apply_to_job("j1", "u1").await;

            match result {
                Err(ApiError::Duplicate(msg)) => {
                    assert_eq!(msg, "You have already applied for this job.")
                }
                other => panic!("expected duplicate rejection, got {:?}", other.map(|_| ())),
            }
        }

        #[tokio::test]
        async fn test_apply_to_missing_job_is_not_found() {
            let server = MockServer::start().await;

            // No existing application; the job lookup then misses
            Mock::given(method("POST"))
                .and(path(RUN_QUERY))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                    { "readTime": "2024-01-01T00:00:00Z" }
                ])))
                .mount(&server)
                .await;

            let lifecycle = lifecycle(&server).await;
            let result = lifecycle.apply_to_job("missing-job", "u1").await;

            match result {
                Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Job not found"),
                other => panic!("expected not found, got {:?}", other.map(|_| ())),
            }
        }
    }
}
