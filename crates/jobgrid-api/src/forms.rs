//! Multipart form extraction.
//!
//! Registration, profile updates and company forms arrive as multipart
//! bodies mixing text fields with file parts. This collects both into a
//! simple lookup structure; files are buffered in memory (the request
//! body limit bounds their size).

use std::collections::HashMap;

use axum::extract::multipart::Multipart;

use crate::error::ApiError;

/// A file part read from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Text fields and file parts of a multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Drain a multipart body into fields and files.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
        {
            let name = match field.name() {
                Some(name) => name.to_string(),
                None => continue,
            };

            if let Some(filename) = field.file_name() {
                let filename = filename.to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
                    .to_vec();
                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        data,
                    },
                );
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Look up a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Look up a text field under any of its accepted names.
    pub fn text_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.text(name))
    }

    /// Look up a file part with a non-empty payload.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).filter(|f| !f.data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_any_checks_aliases_in_order() {
        let mut form = FormData::default();
        form.fields
            .insert("phoneNumber".to_string(), "5551234".to_string());

        assert_eq!(form.text_any(&["phone_number", "phoneNumber"]), Some("5551234"));
        assert_eq!(form.text_any(&["missing"]), None);
    }

    #[test]
    fn test_empty_file_is_ignored() {
        let mut form = FormData::default();
        form.files.insert(
            "logo".to_string(),
            UploadedFile {
                filename: "logo.png".to_string(),
                content_type: None,
                data: Vec::new(),
            },
        );
        assert!(form.file("logo").is_none());
    }
}
