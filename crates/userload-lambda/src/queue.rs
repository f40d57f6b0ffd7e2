//! Message queue access

use crate::error::PublishError;
use async_trait::async_trait;
use aws_sdk_sqs::{error::DisplayErrorContext, Client};
use tracing::{debug, info, instrument};

/// Sink for serialized outbound messages
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Human readable queue identifier for logs and errors
    fn queue(&self) -> &str;

    async fn publish(&self, body: String) -> Result<(), PublishError>;
}

/// SQS backed [`MessagePublisher`], one `SendMessage` per body
#[derive(Clone)]
pub struct SqsPublisher {
    client: Client,
    queue_name: String,
    queue_url: String,
}

impl SqsPublisher {
    /// Resolve `queue_name` to its URL once, up front.
    #[instrument(skip(client))]
    pub async fn connect(client: Client, queue_name: &str) -> Result<Self, PublishError> {
        let response = client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| PublishError {
                queue: queue_name.to_string(),
                message: format!("queue lookup failed: {}", DisplayErrorContext(&e)),
            })?;

        let queue_url = response
            .queue_url()
            .ok_or_else(|| PublishError {
                queue: queue_name.to_string(),
                message: "queue lookup returned no URL".to_string(),
            })?
            .to_string();

        info!(queue = queue_name, url = %queue_url, "Resolved queue");

        Ok(Self {
            client,
            queue_name: queue_name.to_string(),
            queue_url,
        })
    }
}

#[async_trait]
impl MessagePublisher for SqsPublisher {
    fn queue(&self) -> &str {
        &self.queue_name
    }

    async fn publish(&self, body: String) -> Result<(), PublishError> {
        debug!(queue = %self.queue_name, bytes = body.len(), "Sending message");

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| PublishError {
                queue: self.queue_name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
