//! File storage for company logos and user resumes.
//!
//! Uploads go to an S3-compatible bucket (MinIO locally) and are served from
//! a public base URL. The URL is what gets persisted on the owning row.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// A file received from a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload to {key} failed: {message}")]
    Upload { key: String, message: String },
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores the file under `folder` and returns its public URL.
    async fn upload(&self, folder: &str, file: Upload) -> Result<String, StorageError>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FileStorage for S3Storage {
    async fn upload(&self, folder: &str, file: Upload) -> Result<String, StorageError> {
        let key = object_key(folder, file.file_name.as_deref());
        let content_type = file
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.clone(),
                message: e.to_string(),
            })?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}", self.public_url, key))
    }
}

/// `{folder}/{uuid}.{ext}`, keeping only a short alphanumeric extension
/// from the client-supplied file name.
fn object_key(folder: &str, file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{folder}/{}.{ext}", Uuid::new_v4()),
        None => format!("{folder}/{}", Uuid::new_v4()),
    }
}
