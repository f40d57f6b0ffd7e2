//! Error types for file processing

use thiserror::Error;

/// Result type alias for processing operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Everything that can abort the processing of one object
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Invalid object key {0:?}: expected <prefix>/<prefix>/<realm>/<file name>")]
    InvalidObjectKey(String),

    #[error("Malformed CSV input at row {row}: {source}")]
    MalformedInput {
        row: u64,
        #[source]
        source: csv_async::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Object metadata is missing the requester block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "S3 objects must be configured with requester.exid, requester.ip, requester.city, \
     requester.countrycode (missing: {})",
    .missing.join(", ")
)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A key needs a mapping where a value already sits, or the reverse
    #[error("Metadata key {key:?} conflicts with an existing entry at {path:?}")]
    PathConflict { key: String, path: String },
}

#[derive(Error, Debug)]
#[error("Failed to publish to queue {queue}: {message}")]
pub struct PublishError {
    pub queue: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read metadata of s3://{bucket}/{key}: {message}")]
    Head {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("s3://{bucket}/{key} has no last-modified timestamp")]
    MissingLastModified { bucket: String, key: String },

    #[error("Failed to open s3://{bucket}/{key}: {message}")]
    Open {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to delete s3://{bucket}/{key}: {message}")]
    Delete {
        bucket: String,
        key: String,
        message: String,
    },
}

impl ProcessError {
    /// Short machine-friendly label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::Validation(_) => "validation",
            ProcessError::Metadata(_) => "metadata",
            ProcessError::InvalidObjectKey(_) => "invalid_object_key",
            ProcessError::MalformedInput { .. } => "malformed_input",
            ProcessError::Serialization(_) => "serialization",
            ProcessError::Publish(_) => "publish",
            ProcessError::Storage(_) => "storage",
        }
    }
}
