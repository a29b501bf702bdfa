//! Typed repository for user documents.

use std::collections::HashMap;

use jobgrid_models::{Profile, Role, User};
use tracing::info;

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    CollectionSelector, Filter, FromFirestoreValue, MapValue, StructuredQuery, ToFirestoreValue,
    Value,
};

pub const COLLECTION: &str = "users";

/// Repository for the `users` collection.
pub struct UserRepository {
    client: FirestoreClient,
}

impl UserRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &str) -> FirestoreResult<Option<User>> {
        let doc = self.client.get_document(COLLECTION, user_id).await?;
        doc.map(|d| user_from_document(&d)).transpose()
    }

    /// Find a user by exact email.
    pub async fn find_by_email(&self, email: &str) -> FirestoreResult<Option<User>> {
        self.find_one("email", email).await
    }

    /// Find a user by exact fullname. Fullname uniqueness is enforced at
    /// the application level, not by the database.
    pub async fn find_by_fullname(&self, fullname: &str) -> FirestoreResult<Option<User>> {
        self.find_one("fullname", fullname).await
    }

    /// Create a new user record.
    pub async fn create(&self, user: &User) -> FirestoreResult<()> {
        let fields = user_to_fields(user);
        self.client.create_document(COLLECTION, &user.id, fields).await?;
        info!("Created user record: {}", user.id);
        Ok(())
    }

    /// Replace a user record.
    pub async fn update(&self, user: &User) -> FirestoreResult<()> {
        let fields = user_to_fields(user);
        self.client
            .update_document(COLLECTION, &user.id, fields, None)
            .await?;
        Ok(())
    }

    /// Batch-resolve users by id. Missing ids are omitted.
    pub async fn get_many(&self, ids: &[String]) -> FirestoreResult<HashMap<String, User>> {
        let names = ids
            .iter()
            .map(|id| self.client.full_document_name(COLLECTION, id))
            .collect();
        let docs = self.client.batch_get_documents(names, None).await?;

        let mut users = HashMap::new();
        for doc in &docs {
            let user = user_from_document(doc)?;
            users.insert(user.id.clone(), user);
        }
        Ok(users)
    }

    async fn find_one(&self, field: &str, value: &str) -> FirestoreResult<Option<User>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            select: None,
            r#where: Some(Filter::field_equals(field, Value::StringValue(value.to_string()))),
            order_by: None,
            offset: None,
            limit: Some(1),
        };

        let docs = self.client.run_query(query).await?;
        docs.first().map(user_from_document).transpose()
    }
}

/// Convert a user record to Firestore fields.
pub(crate) fn user_to_fields(user: &User) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), user.id.to_firestore_value());
    fields.insert("fullname".to_string(), user.fullname.to_firestore_value());
    fields.insert("email".to_string(), user.email.to_firestore_value());
    fields.insert("phone_number".to_string(), user.phone_number.to_firestore_value());
    fields.insert("password".to_string(), user.password.to_firestore_value());
    fields.insert("role".to_string(), user.role.as_str().to_firestore_value());
    fields.insert("profile".to_string(), profile_to_value(&user.profile));
    fields.insert("created_at".to_string(), user.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), user.updated_at.to_firestore_value());
    fields
}

fn profile_to_value(profile: &Profile) -> Value {
    let mut fields = HashMap::new();
    fields.insert("bio".to_string(), profile.bio.to_firestore_value());
    fields.insert("skills".to_string(), profile.skills.to_firestore_value());
    if let Some(ref resume) = profile.resume {
        fields.insert("resume".to_string(), resume.to_firestore_value());
    }
    if let Some(ref name) = profile.resume_original_name {
        fields.insert("resume_original_name".to_string(), name.to_firestore_value());
    }
    fields.insert(
        "profile_photo".to_string(),
        profile.profile_photo.to_firestore_value(),
    );
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

/// Parse a user document from Firestore.
pub(crate) fn user_from_document(doc: &crate::types::Document) -> FirestoreResult<User> {
    let get_string = |key: &str| -> Option<String> {
        doc.field(key).and_then(String::from_firestore_value)
    };

    let id = get_string("id")
        .or_else(|| doc.doc_id().map(|s| s.to_string()))
        .ok_or_else(|| FirestoreError::InvalidResponse("user document has no id".to_string()))?;

    Ok(User {
        id,
        fullname: get_string("fullname").unwrap_or_default(),
        email: get_string("email").unwrap_or_default(),
        phone_number: get_string("phone_number").unwrap_or_default(),
        password: get_string("password").unwrap_or_default(),
        role: get_string("role")
            .and_then(|s| Role::parse(&s))
            .unwrap_or(Role::Student),
        profile: doc.field("profile").map(profile_from_value).unwrap_or_default(),
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

fn profile_from_value(value: &Value) -> Profile {
    let fields = match value {
        Value::MapValue(MapValue { fields: Some(f) }) => f,
        _ => return Profile::default(),
    };

    let get_string = |key: &str| -> Option<String> {
        fields.get(key).and_then(String::from_firestore_value)
    };

    Profile {
        bio: get_string("bio").unwrap_or_default(),
        skills: fields
            .get("skills")
            .and_then(Vec::<String>::from_firestore_value)
            .unwrap_or_default(),
        resume: get_string("resume"),
        resume_original_name: get_string("resume_original_name"),
        profile_photo: get_string("profile_photo").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let mut user = User::new(
            "Jane Doe",
            "jane@example.com",
            "5551234",
            "$argon2id$hash",
            Role::Recruiter,
            "https://cdn.example.com/avatars/jane.png",
        );
        user.profile.bio = "Hiring manager".to_string();
        user.profile.skills = vec!["sourcing".to_string(), "interviews".to_string()];
        user.profile.resume = Some("https://cdn.example.com/resumes/jane.pdf".to_string());
        user.profile.resume_original_name = Some("jane-cv.pdf".to_string());
        user
    }

    #[test]
    fn test_user_field_round_trip() {
        let user = sample_user();
        let doc = crate::types::Document::new(user_to_fields(&user));
        let parsed = user_from_document(&doc).unwrap();

        assert_eq!(parsed.id, user.id);
        assert_eq!(parsed.email, user.email);
        assert_eq!(parsed.role, Role::Recruiter);
        assert_eq!(parsed.password, user.password);
        assert_eq!(parsed.profile.skills, user.profile.skills);
        assert_eq!(parsed.profile.resume_original_name, user.profile.resume_original_name);
        assert_eq!(parsed.profile.profile_photo, user.profile.profile_photo);
    }

    #[test]
    fn test_user_from_document_requires_id() {
        let doc = crate::types::Document::new(HashMap::new());
        assert!(user_from_document(&doc).is_err());
    }
}
