//! Typed repository for company documents.

use std::collections::HashMap;

use jobgrid_models::Company;
use tracing::info;

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    CollectionSelector, FieldReference, Filter, FromFirestoreValue, Order, StructuredQuery,
    ToFirestoreValue, Value,
};

pub const COLLECTION: &str = "companies";

/// Repository for the `companies` collection.
pub struct CompanyRepository {
    client: FirestoreClient,
}

impl CompanyRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a company by id.
    pub async fn get(&self, company_id: &str) -> FirestoreResult<Option<Company>> {
        let doc = self.client.get_document(COLLECTION, company_id).await?;
        doc.map(|d| company_from_document(&d)).transpose()
    }

    /// Find a company by exact name. Name uniqueness is enforced at write
    /// time through this lookup.
    pub async fn find_by_name(&self, name: &str) -> FirestoreResult<Option<Company>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: Some(Filter::field_equals("name", Value::StringValue(name.to_string()))),
            order_by: None,
            offset: None,
            limit: Some(1),
        };

        let docs = self.client.run_query(query).await?;
        docs.first().map(company_from_document).transpose()
    }

    /// List companies owned by a user, newest first.
    pub async fn list_by_owner(&self, user_id: &str) -> FirestoreResult<Vec<Company>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: Some(Filter::field_equals(
                "user_id",
                Value::StringValue(user_id.to_string()),
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
        docs.iter().map(company_from_document).collect()
    }

    /// Create a new company record.
    pub async fn create(&self, company: &Company) -> FirestoreResult<()> {
        let fields = company_to_fields(company);
        self.client
            .create_document(COLLECTION, &company.id, fields)
            .await?;
        info!("Created company record: {}", company.id);
        Ok(())
    }

    /// Replace a company record.
    pub async fn update(&self, company: &Company) -> FirestoreResult<()> {
        let fields = company_to_fields(company);
        self.client
            .update_document(COLLECTION, &company.id, fields, None)
            .await?;
        Ok(())
    }

    /// Batch-resolve companies by id. Missing ids are omitted.
    pub async fn get_many(&self, ids: &[String]) -> FirestoreResult<HashMap<String, Company>> {
        let names = ids
            .iter()
            .map(|id| self.client.full_document_name(COLLECTION, id))
            .collect();
        let docs = self.client.batch_get_documents(names, None).await?;

        let mut companies = HashMap::new();
        for doc in &docs {
            let company = company_from_document(doc)?;
            companies.insert(company.id.clone(), company);
        }
        Ok(companies)
    }
}

/// Convert a company record to Firestore fields.
pub(crate) fn company_to_fields(company: &Company) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), company.id.to_firestore_value());
    fields.insert("name".to_string(), company.name.to_firestore_value());
    fields.insert("user_id".to_string(), company.user_id.to_firestore_value());
    if let Some(ref description) = company.description {
        fields.insert("description".to_string(), description.to_firestore_value());
    }
    if let Some(ref website) = company.website {
        fields.insert("website".to_string(), website.to_firestore_value());
    }
    if let Some(ref location) = company.location {
        fields.insert("location".to_string(), location.to_firestore_value());
    }
    if let Some(ref logo) = company.logo {
        fields.insert("logo".to_string(), logo.to_firestore_value());
    }
    fields.insert("created_at".to_string(), company.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), company.updated_at.to_firestore_value());
    fields
}

/// Parse a company document from Firestore.
pub(crate) fn company_from_document(doc: &crate::types::Document) -> FirestoreResult<Company> {
    let get_string = |key: &str| -> Option<String> {
        doc.field(key).and_then(String::from_firestore_value)
    };

    let id = get_string("id")
        .or_else(|| doc.doc_id().map(|s| s.to_string()))
        .ok_or_else(|| FirestoreError::InvalidResponse("company document has no id".to_string()))?;

    Ok(Company {
        id,
        name: get_string("name").unwrap_or_default(),
        user_id: get_string("user_id").unwrap_or_default(),
        description: get_string("description"),
        website: get_string("website"),
        location: get_string("location"),
        logo: get_string("logo"),
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
    fn test_company_field_round_trip() {
        let mut company = Company::new("Acme", "user-1", Some("https://cdn/logo.png".to_string()));
        company.description = Some("Widgets".to_string());
        company.location = Some("Pune".to_string());

        let doc = crate::types::Document::new(company_to_fields(&company));
        let parsed = company_from_document(&doc).unwrap();

        assert_eq!(parsed.id, company.id);
        assert_eq!(parsed.name, "Acme");
        assert_eq!(parsed.user_id, "user-1");
        assert_eq!(parsed.logo, company.logo);
        assert_eq!(parsed.website, None);
    }
}
