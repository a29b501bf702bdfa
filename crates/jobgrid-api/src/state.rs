//! Application state.

use std::sync::Arc;

use jobgrid_firestore::{
    ApplicationRepository, CompanyRepository, FirestoreClient, JobRepository, UserRepository,
};
use jobgrid_storage::{MediaStore, R2Client};

use crate::config::ApiConfig;
use crate::services::ApplicationLifecycle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub firestore: Arc<FirestoreClient>,
    pub media: MediaStore,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let firestore = FirestoreClient::from_env().await?;
        let storage = R2Client::from_env().await?;

        Ok(Self {
            config,
            firestore: Arc::new(firestore),
            media: MediaStore::new(storage),
        })
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new((*self.firestore).clone())
    }

    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::new((*self.firestore).clone())
    }

    pub fn jobs(&self) -> JobRepository {
        JobRepository::new((*self.firestore).clone())
    }

    pub fn applications(&self) -> ApplicationRepository {
        ApplicationRepository::new((*self.firestore).clone())
    }

    pub fn lifecycle(&self) -> ApplicationLifecycle {
        ApplicationLifecycle::new((*self.firestore).clone())
    }
}
