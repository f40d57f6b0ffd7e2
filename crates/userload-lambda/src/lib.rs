//! Userload Lambda
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Turns a CSV of users dropped into S3 into one "create user" SQS message per row.
//!
//! # Pipeline
//!
//! 1. [`metadata`] compiles the object's `-` delimited user metadata into a tree
//! 2. [`validate`] rejects objects without the `requester` fields
//! 3. [`task`] derives the realm, file name and task id
//! 4. [`activity`] announces the run on the activity queue (optional)
//! 5. [`transform`] streams the CSV body and publishes a message per row
//! 6. [`processor`] sequences the above and deletes the source object on success
//!
//! Storage and queue access go through the [`storage::ObjectStore`] and
//! [`queue::MessagePublisher`] traits; S3 and SQS implementations live next to them.
//!
//! # Example
//!
//! ```no_run
//! use userload_lambda::{config::Config, processor::FileProcessor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let processor = FileProcessor::from_config(&config).await?;
//!     let processed = processor
//!         .process("uploads", "test/create-users/dce.test/users.csv")
//!         .await?;
//!     println!("sent {processed} messages");
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod metadata;
pub mod processor;
pub mod queue;
pub mod storage;
pub mod task;
pub mod transform;
pub mod validate;

pub use error::{ProcessError, Result};
