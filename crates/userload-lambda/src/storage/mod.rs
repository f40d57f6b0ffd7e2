//! Object store access
//!
//! The processor only needs three things from the bucket: the object's metadata and upload
//! time, a streaming reader over its body, and a way to delete it.

use crate::error::StorageError;
use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, Client};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tracing::{debug, info, instrument};

/// Streaming object body; never buffered as a whole
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// What a HEAD request tells us about an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    /// User metadata with the provider prefix (`x-amz-meta-`) already stripped
    pub metadata: HashMap<String, String>,
    pub last_modified: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectHead, StorageError>;

    async fn open(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

/// S3 backed [`ObjectStore`]
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectHead, StorageError> {
        debug!("Reading metadata of s3://{}/{}", bucket, key);

        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Head {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let last_modified = response
            .last_modified()
            .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()))
            .ok_or_else(|| StorageError::MissingLastModified {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        Ok(ObjectHead {
            metadata: response.metadata().cloned().unwrap_or_default(),
            last_modified,
        })
    }

    #[instrument(skip(self))]
    async fn open(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        debug!("Opening stream from s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Open {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(Box::pin(response.body.into_async_read()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!("Deleted s3://{}/{}", bucket, key);
        Ok(())
    }
}
