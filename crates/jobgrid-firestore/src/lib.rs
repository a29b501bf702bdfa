//! Firestore REST API client for the JobGrid backend.
//!
//! This crate provides:
//! - Typed repositories for users, companies, jobs and applications
//! - Atomic batch writes for the apply flow (Application insert + Job
//!   cross-reference update)
//! - Service account authentication via gcp_auth, with emulator support
//! - Structured queries, merge updates and retry logic

pub mod application_repo;
pub mod client;
pub mod company_repo;
pub mod error;
pub mod job_repo;
pub mod metrics;
pub mod retry;
pub mod token_cache;
pub mod types;
pub mod user_repo;

pub use application_repo::ApplicationRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use company_repo::CompanyRepository;
pub use error::{FirestoreError, FirestoreResult};
pub use job_repo::JobRepository;
pub use user_repo::UserRepository;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
