//! Per-object orchestration

use crate::activity::emit_activity;
use crate::config::Config;
use crate::error::Result;
use crate::metadata::compile;
use crate::queue::{MessagePublisher, SqsPublisher};
use crate::storage::{ObjectStore, S3ObjectStore};
use crate::task::{make_task_id, ObjectKey, TaskContext};
use crate::transform::transform;
use crate::validate::validate_requester;
use tracing::{info, instrument, Span};

/// Runs one uploaded CSV through the pipeline.
///
/// The sequence is: parse the key, read metadata, compile and validate it, derive the task
/// id, optionally announce the run, stream the rows, optionally announce completion, then
/// delete the object. Any failure stops the run where it is: the object stays in the bucket
/// and no completion message is sent. Messages already published stay published.
pub struct FileProcessor<S, P> {
    store: S,
    users: P,
    activity: Option<P>,
}

impl<S, P> FileProcessor<S, P>
where
    S: ObjectStore,
    P: MessagePublisher,
{
    pub fn new(store: S, users: P, activity: Option<P>) -> Self {
        Self {
            store,
            users,
            activity,
        }
    }

    pub fn activity_enabled(&self) -> bool {
        self.activity.is_some()
    }

    /// Process `s3://bucket/key`, returning the number of rows published.
    #[instrument(skip(self), fields(task_id = tracing::field::Empty))]
    pub async fn process(&self, bucket: &str, key: &str) -> Result<u64> {
        let object = ObjectKey::parse(key)?;
        let head = self.store.head(bucket, key).await?;

        let metadata = compile(&head.metadata)?;
        validate_requester(&metadata)?;

        let task_id = make_task_id(head.last_modified.timestamp_millis(), &object.file_name);
        Span::current().record("task_id", task_id.as_str());
        let context = TaskContext::new(metadata, object.realm, task_id);

        if let Some(activity) = &self.activity {
            emit_activity(&context, &object.file_name, &head.last_modified, 0, activity).await?;
        }

        let body = self.store.open(bucket, key).await?;
        let processed = transform(body, &context, &self.users).await?;
        info!(processed, "Sent [{}] create user messages", processed);

        if let Some(activity) = &self.activity {
            emit_activity(
                &context,
                &object.file_name,
                &head.last_modified,
                processed,
                activity,
            )
            .await?;
        }

        self.store.delete(bucket, key).await?;
        Ok(processed)
    }
}

impl FileProcessor<S3ObjectStore, SqsPublisher> {
    /// Build the AWS backed processor, resolving queue URLs up front.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let sdk = config.aws.load().await;
        let store = S3ObjectStore::new(config.aws.s3_client(&sdk));
        let sqs = config.aws.sqs_client(&sdk);

        let users = SqsPublisher::connect(sqs.clone(), &config.create_users_queue).await?;
        let activity = match &config.activity_queue {
            Some(queue) => Some(SqsPublisher::connect(sqs, queue).await?),
            None => {
                info!("Activity reporting disabled");
                None
            }
        };

        Ok(Self::new(store, users, activity))
    }
}
