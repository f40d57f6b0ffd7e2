//! In-memory stand-ins for S3 and SQS shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use userload_lambda::error::{PublishError, StorageError};
use userload_lambda::processor::FileProcessor;
use userload_lambda::queue::MessagePublisher;
use userload_lambda::storage::{ObjectBody, ObjectHead, ObjectStore};

pub const BUCKET: &str = "test-dce-id-users-bulk-operation";
pub const KEY: &str = "test/create-users/dce.test/users.csv";
pub const BODY: &str = "email, name\nuser1@mail.com,User1\nuser2@mail.com,User2";

pub fn uploaded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2012, 1, 1, 12, 0, 0).unwrap()
}

pub fn requester_metadata() -> HashMap<String, String> {
    [
        ("requester-exid", "admin|exid"),
        ("requester-ip", "1.2.3.4"),
        ("requester-city", "Minas Tirith"),
        ("requester-countrycode", "Gondor"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub metadata: HashMap<String, String>,
    pub last_modified: DateTime<Utc>,
}

/// Body that hands out at most `chunk` bytes per read and counts what it served
pub struct ChunkedBody {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    served: Arc<AtomicUsize>,
}

impl AsyncRead for ChunkedBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let end = (this.pos + this.chunk.min(buf.remaining())).min(this.data.len());
        buf.put_slice(&this.data[this.pos..end]);
        this.served.fetch_add(end - this.pos, Ordering::SeqCst);
        this.pos = end;
        Poll::Ready(Ok(()))
    }
}

/// Bucket contents keyed by `(bucket, key)`
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<(String, String), StoredObject>>>,
    chunk: Option<usize>,
    served: Arc<AtomicUsize>,
    fail_delete: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Bodies are served `chunk` bytes per read
    pub fn chunked(chunk: usize) -> Self {
        Self {
            chunk: Some(chunk),
            ..Self::default()
        }
    }

    /// Body bytes handed out so far, shared with every clone
    pub fn served(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.served)
    }

    /// Make every following delete fail
    pub fn failing_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn put(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Vec<u8>>,
        metadata: HashMap<String, String>,
        last_modified: DateTime<Utc>,
    ) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                metadata,
                last_modified,
            },
        );
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

fn not_found(bucket: &str, key: &str) -> String {
    format!("NoSuchKey: {bucket}/{key}")
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectHead, StorageError> {
        let object = self.get(bucket, key).ok_or_else(|| StorageError::Head {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: not_found(bucket, key),
        })?;
        Ok(ObjectHead {
            metadata: object.metadata,
            last_modified: object.last_modified,
        })
    }

    async fn open(&self, bucket: &str, key: &str) -> Result<ObjectBody, StorageError> {
        let object = self.get(bucket, key).ok_or_else(|| StorageError::Open {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: not_found(bucket, key),
        })?;
        match self.chunk {
            Some(chunk) => Ok(Box::pin(ChunkedBody {
                data: object.body,
                pos: 0,
                chunk,
                served: self.served(),
            })),
            None => Ok(Box::pin(Cursor::new(object.body))),
        }
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "AccessDenied".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

/// Records every body it is given; optionally fails once `fail_after` messages went through
#[derive(Clone)]
pub struct RecordingQueue {
    name: String,
    sent: Arc<Mutex<Vec<String>>>,
    fail_after: Option<usize>,
    watch: Option<Arc<AtomicUsize>>,
    observed: Arc<Mutex<Vec<usize>>>,
}

impl RecordingQueue {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sent: Arc::default(),
            fail_after: None,
            watch: None,
            observed: Arc::default(),
        }
    }

    /// Snapshot `counter` at every accepted publish
    pub fn watching(name: &str, counter: Arc<AtomicUsize>) -> Self {
        Self {
            watch: Some(counter),
            ..Self::new(name)
        }
    }

    pub fn observed(&self) -> Vec<usize> {
        self.observed.lock().unwrap().clone()
    }

    pub fn failing_after(name: &str, accepted: usize) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Self::new(name)
        }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Value> {
        self.bodies()
            .iter()
            .map(|body| serde_json::from_str(body).unwrap())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagePublisher for RecordingQueue {
    fn queue(&self) -> &str {
        &self.name
    }

    async fn publish(&self, body: String) -> Result<(), PublishError> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|limit| sent.len() >= limit) {
            return Err(PublishError {
                queue: self.name.clone(),
                message: "ServiceUnavailable".to_string(),
            });
        }
        if let Some(counter) = &self.watch {
            self.observed
                .lock()
                .unwrap()
                .push(counter.load(Ordering::SeqCst));
        }
        sent.push(body);
        Ok(())
    }
}

/// Store, user queue and activity queue wired into a processor
pub struct Harness {
    pub store: MemoryStore,
    pub users: RecordingQueue,
    pub activity: RecordingQueue,
    pub processor: FileProcessor<MemoryStore, RecordingQueue>,
}

impl Harness {
    pub fn new(activity_enabled: bool) -> Self {
        Self::with_queues(
            RecordingQueue::new("CREATE_USERS_SQS_QUEUE"),
            RecordingQueue::new("BULK_ACTIVITY_SQS_QUEUE"),
            activity_enabled,
        )
    }

    pub fn with_queues(
        users: RecordingQueue,
        activity: RecordingQueue,
        activity_enabled: bool,
    ) -> Self {
        Self::with_parts(MemoryStore::default(), users, activity, activity_enabled)
    }

    pub fn with_parts(
        store: MemoryStore,
        users: RecordingQueue,
        activity: RecordingQueue,
        activity_enabled: bool,
    ) -> Self {
        let processor = FileProcessor::new(
            store.clone(),
            users.clone(),
            activity_enabled.then(|| activity.clone()),
        );
        Self {
            store,
            users,
            activity,
            processor,
        }
    }

    pub fn put_users_file(&self, body: &str) {
        self.store
            .put(BUCKET, KEY, body, requester_metadata(), uploaded_at());
    }
}
