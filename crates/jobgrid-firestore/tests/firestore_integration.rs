//! Firestore integration tests.
//!
//! These run against real credentials (or an emulator via
//! `FIRESTORE_EMULATOR_HOST`) and are ignored by default.

use jobgrid_firestore::{
    ApplicationRepository, CompanyRepository, FirestoreClient, JobRepository, UserRepository,
};
use jobgrid_models::{Application, ApplicationStatus, Company, Job, Role, Salary, User};

async fn client() -> FirestoreClient {
    dotenvy::dotenv().ok();
    FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client")
}

#[tokio::test]
#[ignore = "requires Firestore credentials or emulator"]
async fn test_user_repository_round_trip() {
    let client = client().await;
    let repo = UserRepository::new(client);

    let user = User::new(
        "Integration Test User",
        "integration-user@example.com",
        "5550000",
        "$argon2id$test",
        Role::Student,
        "https://cdn.example.com/avatars/test.png",
    );

    repo.create(&user).await.expect("Failed to create user");

    let fetched = repo
        .get(&user.id)
        .await
        .expect("Failed to get user")
        .expect("user exists");
    assert_eq!(fetched.email, user.email);

    let by_email = repo
        .find_by_email(&user.email)
        .await
        .expect("Failed to query by email");
    assert!(by_email.is_some());
}

#[tokio::test]
#[ignore = "requires Firestore credentials or emulator"]
async fn test_apply_flow_keeps_cross_reference_consistent() {
    let client = client().await;
    let jobs = JobRepository::new(client.clone());
    let companies = CompanyRepository::new(client.clone());
    let applications = ApplicationRepository::new(client);

    let company = Company::new("Integration Test Co", "recruiter-integration", None);
    companies.create(&company).await.expect("create company");

    let job = Job::new(
        "Integration Test Job",
        "Test description",
        vec!["testing".to_string()],
        Salary::Amount(1000.0),
        "Remote",
        "contract",
        "1 year",
        1,
        &company.id,
        "recruiter-integration",
    );
    jobs.create(&job).await.expect("create job");

    let application = Application::new(&job.id, "student-integration");
    let (job_read, update_time) = jobs
        .get_with_update_time(&job.id)
        .await
        .expect("read job")
        .expect("job exists");
    applications
        .create_linked(&application, &job_read, update_time.as_deref())
        .await
        .expect("create linked application");

    // Both sides of the cross-reference must agree
    let job_after = jobs.get(&job.id).await.expect("read job").expect("job exists");
    assert_eq!(
        job_after
            .applications
            .iter()
            .filter(|id| **id == application.id)
            .count(),
        1
    );

    let stored = applications
        .get(&application.id)
        .await
        .expect("read application")
        .expect("application exists");
    assert_eq!(stored.job, job.id);
    assert_eq!(stored.status, ApplicationStatus::Pending);

    // A second linked insert for the same pair must fail the duplicate query
    let duplicate = applications
        .find_by_job_and_applicant(&job.id, "student-integration")
        .await
        .expect("duplicate query");
    assert!(duplicate.is_some());
}
