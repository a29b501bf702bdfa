//! Typed repository for application documents.
//!
//! Owns the write side of the Job↔Application cross-reference: an apply
//! is one atomic batch write that inserts the Application and appends its
//! id to the Job's list, guarded by preconditions on both documents.

use std::collections::HashMap;

use chrono::Utc;
use jobgrid_models::{Application, ApplicationStatus, Job};
use tracing::info;

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    CollectionSelector, Document, DocumentMask, FieldReference, Filter, FromFirestoreValue, Order,
    Precondition, StructuredQuery, ToFirestoreValue, Value, Write,
};
use crate::job_repo;

pub const COLLECTION: &str = "applications";

/// Repository for the `applications` collection.
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get an application by id.
    pub async fn get(&self, application_id: &str) -> FirestoreResult<Option<Application>> {
        let doc = self.client.get_document(COLLECTION, application_id).await?;
        doc.map(|d| application_from_document(&d)).transpose()
    }

    /// Find the application for a (job, applicant) pair, if any.
    pub async fn find_by_job_and_applicant(
        &self,
        job_id: &str,
        applicant_id: &str,
    ) -> FirestoreResult<Option<Application>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: Some(Filter::and(vec![
                Filter::field_equals("job", Value::StringValue(job_id.to_string())),
                Filter::field_equals("applicant", Value::StringValue(applicant_id.to_string())),
            ])),
            order_by: None,
            offset: None,
            limit: Some(1),
        };

        let docs = self.client.run_query(query).await?;
        docs.first().map(application_from_document).transpose()
    }

    /// List an applicant's applications, newest first.
    pub async fn list_by_applicant(&self, applicant_id: &str) -> FirestoreResult<Vec<Application>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: Some(Filter::field_equals(
                "applicant",
                Value::StringValue(applicant_id.to_string()),
            )),
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: "created_at".to_string(),
                },
                direction: "DESCENDING".to_string(),
            }]),
            offset: None,
            limit: None,
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(application_from_document).collect()
    }

    /// Insert an application and append its id to the job's list in one
    /// atomic batch write.
    ///
    /// Preconditions: the Application document must not exist yet
    /// (`exists: false`) and the Job document must still carry
    /// `job_update_time` (when known). A precondition failure means a
    /// concurrent writer touched the Job; callers re-read and retry.
    pub async fn create_linked(
        &self,
        application: &Application,
        job: &Job,
        job_update_time: Option<&str>,
    ) -> FirestoreResult<()> {
        let application_write = Write {
            update: Some(Document::named(
                self.client.full_document_name(COLLECTION, &application.id),
                application_to_fields(application),
            )),
            delete: None,
            update_mask: None,
            current_document: Some(Precondition {
                exists: Some(false),
                update_time: None,
            }),
        };

        let mut applications = job.applications.clone();
        applications.push(application.id.clone());

        let mut job_fields = HashMap::new();
        job_fields.insert("applications".to_string(), applications.to_firestore_value());
        job_fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        let job_write = Write {
            update: Some(Document::named(
                self.client.full_document_name(job_repo::COLLECTION, &job.id),
                job_fields,
            )),
            delete: None,
            update_mask: Some(DocumentMask {
                field_paths: vec!["applications".to_string(), "updated_at".to_string()],
            }),
            current_document: Some(match job_update_time {
                Some(ts) => Precondition {
                    exists: None,
                    update_time: Some(ts.to_string()),
                },
                None => Precondition {
                    exists: Some(true),
                    update_time: None,
                },
            }),
        };

        self.client
            .batch_write(vec![application_write, job_write])
            .await?;

        info!(
            "Created application {} for job {} (applicant {})",
            application.id, application.job, application.applicant
        );
        Ok(())
    }

    /// Update an application's status.
    pub async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), status.as_str().to_firestore_value());
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        self.client
            .update_document(
                COLLECTION,
                application_id,
                fields,
                Some(vec!["status".to_string(), "updated_at".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Batch-resolve applications by id. Missing ids are omitted.
    pub async fn get_many(&self, ids: &[String]) -> FirestoreResult<Vec<Application>> {
        let names = ids
            .iter()
            .map(|id| self.client.full_document_name(COLLECTION, id))
            .collect();
        let docs = self.client.batch_get_documents(names, None).await?;
        docs.iter().map(application_from_document).collect()
    }
}

/// Convert an application record to Firestore fields.
pub(crate) fn application_to_fields(application: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), application.id.to_firestore_value());
    fields.insert("job".to_string(), application.job.to_firestore_value());
    fields.insert("applicant".to_string(), application.applicant.to_firestore_value());
    fields.insert(
        "status".to_string(),
        application.status.as_str().to_firestore_value(),
    );
    fields.insert(
        "created_at".to_string(),
        application.created_at.to_firestore_value(),
    );
    fields.insert(
        "updated_at".to_string(),
        application.updated_at.to_firestore_value(),
    );
    fields
}

/// Parse an application document from Firestore.
pub(crate) fn application_from_document(doc: &Document) -> FirestoreResult<Application> {
    let get_string = |key: &str| -> Option<String> {
        doc.field(key).and_then(String::from_firestore_value)
    };

    let id = get_string("id")
        .or_else(|| doc.doc_id().map(|s| s.to_string()))
        .ok_or_else(|| {
            FirestoreError::InvalidResponse("application document has no id".to_string())
        })?;

    Ok(Application {
        id,
        job: get_string("job").unwrap_or_default(),
        applicant: get_string("applicant").unwrap_or_default(),
        status: get_string("status")
            .and_then(|s| ApplicationStatus::parse(&s))
            .unwrap_or_default(),
        created_at: doc
            .field("created_at")
            .and_then(chrono::DateTime::from_firestore_value)
            .unwrap_or_else(chrono::Utc::now),
        updated_at: doc
            .field("updated_at")
            .and_then(chrono::DateTime::from_firestore_value)
            .unwrap_or_else(chrono::Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_field_round_trip() {
        let mut application = Application::new("job-1", "user-1");
        application.status = ApplicationStatus::Accepted;

        let doc = Document::new(application_to_fields(&application));
        let parsed = application_from_document(&doc).unwrap();

        assert_eq!(parsed.id, application.id);
        assert_eq!(parsed.job, "job-1");
        assert_eq!(parsed.applicant, "user-1");
        assert_eq!(parsed.status, ApplicationStatus::Accepted);
    }

    #[test]
    fn test_unknown_status_defaults_to_pending() {
        let mut application = Application::new("job-1", "user-1");
        application.status = ApplicationStatus::Pending;
        let mut fields = application_to_fields(&application);
        fields.insert(
            "status".to_string(),
            Value::StringValue("shortlisted".to_string()),
        );

        let parsed = application_from_document(&Document::new(fields)).unwrap();
        assert_eq!(parsed.status, ApplicationStatus::Pending);
    }
}
