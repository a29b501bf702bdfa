//! Media upload operations.
//!
//! Uploads are keyed `{folder}/{uuid}.{ext}` so user-supplied filenames
//! never reach the bucket path. The original filename is returned to the
//! caller for records that keep it (resumes).

use tracing::info;
use uuid::Uuid;

use crate::client::R2Client;
use crate::error::{StorageError, StorageResult};

/// Bucket folder per media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    Avatars,
    Resumes,
    CompanyLogos,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFolder::Avatars => "avatars",
            MediaFolder::Resumes => "resumes",
            MediaFolder::CompanyLogos => "company_logos",
        }
    }
}

/// A completed media upload.
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    /// Public URL of the stored object.
    pub url: String,
    /// Filename as supplied by the uploader.
    pub original_name: String,
}

/// Media store facade over the bucket client.
#[derive(Clone)]
pub struct MediaStore {
    client: R2Client,
}

impl MediaStore {
    pub fn new(client: R2Client) -> Self {
        Self { client }
    }

    /// Upload a media payload and return its public URL.
    pub async fn upload(
        &self,
        folder: MediaFolder,
        original_name: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> StorageResult<UploadedMedia> {
        if data.is_empty() {
            return Err(StorageError::upload_failed("empty file payload"));
        }

        let key = object_key(folder, original_name);
        let content_type = content_type.unwrap_or("application/octet-stream");

        self.client.upload_bytes(data, &key, content_type).await?;

        let url = self.client.public_url(&key);
        info!("Uploaded {} media to {}", folder.as_str(), key);

        Ok(UploadedMedia {
            url,
            original_name: original_name.to_string(),
        })
    }
}

/// Build an object key from the folder and the original filename's
/// extension. The extension is kept only when it is a short alphanumeric
/// suffix.
pub fn object_key(folder: MediaFolder, original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });

    match ext {
        Some(ext) => format!("{}/{}.{}", folder.as_str(), Uuid::new_v4(), ext.to_lowercase()),
        None => format!("{}/{}", folder.as_str(), Uuid::new_v4()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_names() {
        assert_eq!(MediaFolder::Avatars.as_str(), "avatars");
        assert_eq!(MediaFolder::Resumes.as_str(), "resumes");
        assert_eq!(MediaFolder::CompanyLogos.as_str(), "company_logos");
    }

    #[test]
    fn test_object_key_keeps_extension() {
        let key = object_key(MediaFolder::Resumes, "Jane CV.PDF");
        assert!(key.starts_with("resumes/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_object_key_drops_suspicious_extension() {
        let key = object_key(MediaFolder::Avatars, "photo.tar.gz/../x");
        assert!(key.starts_with("avatars/"));
        assert!(!key.contains(".."));
        assert!(!key.contains("/x"));
    }

    #[test]
    fn test_object_key_without_extension() {
        let key = object_key(MediaFolder::Avatars, "photo");
        assert!(key.starts_with("avatars/"));
        assert!(!key.ends_with('.'));
    }

    #[test]
    fn test_object_keys_are_unique() {
        let a = object_key(MediaFolder::Avatars, "p.png");
        let b = object_key(MediaFolder::Avatars, "p.png");
        assert_ne!(a, b);
    }
}
