//! S3 notification handling
//!
//! Records in one event are processed strictly one after another. The first failure is
//! logged and returned, which also abandons the remaining records of that event.

use crate::error::{ProcessError, Result};
use crate::processor::FileProcessor;
use crate::queue::MessagePublisher;
use crate::storage::ObjectStore;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// The subset of an S3 event notification we read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<TriggerRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded, spaces as `+`
    pub key: String,
}

impl TriggerRecord {
    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    /// The object key with notification encoding removed.
    pub fn object_key(&self) -> Result<String> {
        let raw = &self.s3.object.key;
        urlencoding::decode(&raw.replace('+', " "))
            .map(|decoded| decoded.into_owned())
            .map_err(|_| ProcessError::InvalidObjectKey(raw.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedObject {
    pub bucket: String,
    pub key: String,
    pub records: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    pub processed: Vec<ProcessedObject>,
}

pub async fn handle_event<S, P>(
    processor: &FileProcessor<S, P>,
    event: TriggerEvent,
) -> Result<HandlerResponse>
where
    S: ObjectStore,
    P: MessagePublisher,
{
    let mut response = HandlerResponse::default();

    for record in &event.records {
        let bucket = record.bucket();
        let key = match record.object_key() {
            Ok(key) => key,
            Err(e) => {
                error!(bucket, error = %e, kind = e.kind(), "Process failed");
                return Err(e);
            }
        };

        info!("Process [{}/{}] started", bucket, key);
        match processor.process(bucket, &key).await {
            Ok(records) => {
                info!(
                    "Process [{}/{}] finished, processed [{}] records",
                    bucket, key, records
                );
                response.processed.push(ProcessedObject {
                    bucket: bucket.to_string(),
                    key,
                    records,
                });
            }
            Err(e) => {
                error!(bucket, key = %key, error = %e, kind = e.kind(), "Process failed");
                return Err(e);
            }
        }
    }

    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_notification() {
        let event: TriggerEvent = serde_json::from_value(serde_json::json!({
            "Records": [{
                "eventSource": "aws:s3",
                "s3": {
                    "bucket": {"name": "test-dce-id-users-bulk-operation", "arn": "arn:aws:s3:::x"},
                    "object": {"key": "test/create-users/dce.test/users.csv", "size": 52}
                }
            }]
        }))
        .unwrap();

        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].bucket(), "test-dce-id-users-bulk-operation");
        assert_eq!(
            event.records[0].object_key().unwrap(),
            "test/create-users/dce.test/users.csv"
        );
    }

    #[test]
    fn test_missing_records_is_empty() {
        let event: TriggerEvent = serde_json::from_str("{}").unwrap();
        assert!(event.records.is_empty());
    }

    #[test]
    fn test_object_key_is_decoded() {
        let record: TriggerRecord = serde_json::from_value(serde_json::json!({
            "s3": {
                "bucket": {"name": "b"},
                "object": {"key": "test/create-users/dce.test/new+users%281%29.csv"}
            }
        }))
        .unwrap();
        assert_eq!(
            record.object_key().unwrap(),
            "test/create-users/dce.test/new users(1).csv"
        );
    }
}
