//! Typed repository for job documents.

use std::collections::HashMap;

use jobgrid_models::{Job, Salary};
use tracing::info;

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    CollectionSelector, FieldReference, Filter, FromFirestoreValue, Order, Projection,
    StructuredQuery, ToFirestoreValue, Value,
};

pub const COLLECTION: &str = "jobs";

/// Repository for the `jobs` collection.
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a job by id.
    pub async fn get(&self, job_id: &str) -> FirestoreResult<Option<Job>> {
        Ok(self.get_with_update_time(job_id).await?.map(|(job, _)| job))
    }

    /// Get a job along with its document update time, for guarded writes.
    pub async fn get_with_update_time(
        &self,
        job_id: &str,
    ) -> FirestoreResult<Option<(Job, Option<String>)>> {
        let doc = self.client.get_document(COLLECTION, job_id).await?;
        match doc {
            Some(d) => {
                let job = job_from_document(&d)?;
                Ok(Some((job, d.update_time.clone())))
            }
            None => Ok(None),
        }
    }

    /// Create a new job record.
    pub async fn create(&self, job: &Job) -> FirestoreResult<()> {
        let fields = job_to_fields(job);
        self.client.create_document(COLLECTION, &job.id, fields).await?;
        info!("Created job record: {}", job.id);
        Ok(())
    }

    /// Replace a job record.
    pub async fn update(&self, job: &Job) -> FirestoreResult<()> {
        let fields = job_to_fields(job);
        self.client
            .update_document(COLLECTION, &job.id, fields, None)
            .await?;
        Ok(())
    }

    /// List all jobs, newest first.
    pub async fn list_newest_first(&self) -> FirestoreResult<Vec<Job>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: None,
            order_by: Some(vec![created_at_desc()]),
            offset: None,
            limit: None,
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(job_from_document).collect()
    }

    /// List jobs created by a user, newest first, with offset pagination.
    pub async fn list_by_creator(
        &self,
        user_id: &str,
        offset: u32,
        limit: u32,
    ) -> FirestoreResult<Vec<Job>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: Some(Filter::field_equals(
                "created_by",
                Value::StringValue(user_id.to_string()),
            )),
            order_by: Some(vec![created_at_desc()]),
            offset: Some(offset as i32),
            limit: Some(limit as i32),
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(job_from_document).collect()
    }

    /// Count jobs created by a user.
    ///
    /// Uses a `__name__` projection so only document references travel
    /// over the wire.
    pub async fn count_by_creator(&self, user_id: &str) -> FirestoreResult<u32> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: Some(Projection {
                fields: vec![FieldReference {
                    field_path: "__name__".to_string(),
                }],
            }),
            r#where: Some(Filter::field_equals(
                "created_by",
                Value::StringValue(user_id.to_string()),
            )),
            order_by: None,
            offset: None,
            limit: None,
        };

        let docs = self.client.run_query(query).await?;
        Ok(docs.len() as u32)
    }

    /// Batch-resolve jobs by id. Missing ids are omitted.
    pub async fn get_many(&self, ids: &[String]) -> FirestoreResult<HashMap<String, Job>> {
        let names = ids
            .iter()
            .map(|id| self.client.full_document_name(COLLECTION, id))
            .collect();
        let docs = self.client.batch_get_documents(names, None).await?;

        let mut jobs = HashMap::new();
        for doc in &docs {
            let job = job_from_document(doc)?;
            jobs.insert(job.id.clone(), job);
        }
        Ok(jobs)
    }
}

fn created_at_desc() -> Order {
    Order {
        field: FieldReference {
            field_path: "created_at".to_string(),
        },
        direction: "DESCENDING".to_string(),
    }
}

/// Convert a job record to Firestore fields.
pub(crate) fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), job.id.to_firestore_value());
    fields.insert("title".to_string(), job.title.to_firestore_value());
    fields.insert("description".to_string(), job.description.to_firestore_value());
    fields.insert("requirements".to_string(), job.requirements.to_firestore_value());
    fields.insert("salary".to_string(), salary_to_value(&job.salary));
    fields.insert("location".to_string(), job.location.to_firestore_value());
    fields.insert("job_type".to_string(), job.job_type.to_firestore_value());
    fields.insert(
        "experience_level".to_string(),
        job.experience_level.to_firestore_value(),
    );
    fields.insert("position".to_string(), job.position.to_firestore_value());
    fields.insert("company".to_string(), job.company.to_firestore_value());
    fields.insert("created_by".to_string(), job.created_by.to_firestore_value());
    fields.insert("applications".to_string(), job.applications.to_firestore_value());
    fields.insert("created_at".to_string(), job.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_firestore_value());
    fields
}

/// Salary is stored as a double for plain amounts and a string for
/// `"min-max"` ranges, mirroring the wire shape.
fn salary_to_value(salary: &Salary) -> Value {
    match salary {
        Salary::Amount(amount) => Value::DoubleValue(*amount),
        Salary::Range(range) => Value::StringValue(range.clone()),
    }
}

fn salary_from_value(value: &Value) -> Option<Salary> {
    match value {
        Value::DoubleValue(f) => Some(Salary::Amount(*f)),
        Value::IntegerValue(s) => s.parse::<f64>().ok().map(Salary::Amount),
        Value::StringValue(s) => Some(Salary::Range(s.clone())),
        _ => None,
    }
}

/// Parse a job document from Firestore.
pub(crate) fn job_from_document(doc: &crate::types::Document) -> FirestoreResult<Job> {
    let get_string = |key: &str| -> Option<String> {
        doc.field(key).and_then(String::from_firestore_value)
    };

    let id = get_string("id")
        .or_else(|| doc.doc_id().map(|s| s.to_string()))
        .ok_or_else(|| FirestoreError::InvalidResponse("job document has no id".to_string()))?;

    Ok(Job {
        id,
        title: get_string("title").unwrap_or_default(),
        description: get_string("description").unwrap_or_default(),
        requirements: doc
            .field("requirements")
            .and_then(Vec::<String>::from_firestore_value)
            .unwrap_or_default(),
        salary: doc
            .field("salary")
            .and_then(salary_from_value)
            .unwrap_or(Salary::Amount(0.0)),
        location: get_string("location").unwrap_or_default(),
        job_type: get_string("job_type").unwrap_or_default(),
        experience_level: get_string("experience_level").unwrap_or_default(),
        position: doc
            .field("position")
            .and_then(u32::from_firestore_value)
            .unwrap_or(0),
        company: get_string("company").unwrap_or_default(),
        created_by: get_string("created_by").unwrap_or_default(),
        applications: doc
            .field("applications")
            .and_then(Vec::<String>::from_firestore_value)
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

    fn sample_job() -> Job {
        Job::new(
            "Backend Engineer",
            "Build the API",
            vec!["rust".to_string(), "firestore".to_string()],
            Salary::Range("50000-70000".to_string()),
            "Remote",
            "full-time",
            "3 years",
            2,
            "company-1",
            "user-1",
        )
    }

    #[test]
    fn test_job_field_round_trip() {
        let mut job = sample_job();
        job.applications = vec!["app-1".to_string(), "app-2".to_string()];

        let doc = crate::types::Document::new(job_to_fields(&job));
        let parsed = job_from_document(&doc).unwrap();

        assert_eq!(parsed.id, job.id);
        assert_eq!(parsed.salary, Salary::Range("50000-70000".to_string()));
        assert_eq!(parsed.requirements, job.requirements);
        assert_eq!(parsed.applications, job.applications);
        assert_eq!(parsed.position, 2);
    }

    #[test]
    fn test_numeric_salary_round_trip() {
        let mut job = sample_job();
        job.salary = Salary::Amount(55000.0);

        let doc = crate::types::Document::new(job_to_fields(&job));
        let parsed = job_from_document(&doc).unwrap();
        assert_eq!(parsed.salary, Salary::Amount(55000.0));
    }
}
