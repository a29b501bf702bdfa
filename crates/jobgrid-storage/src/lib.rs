//! S3-compatible media storage for the JobGrid backend.
//!
//! This crate provides:
//! - An R2-style bucket client (upload + public URL resolution)
//! - A media store facade with per-category folders (avatars, resumes,
//!   company logos)

pub mod client;
pub mod error;
pub mod media;

pub use client::{R2Client, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use media::{object_key, MediaFolder, MediaStore, UploadedMedia};
