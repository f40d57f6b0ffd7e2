//! Configuration management
//!
//! Everything comes from the Lambda environment. A `.env` file is honoured for local runs.

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::Region;
use userload_common::env::{self, process_lookup};
use userload_common::{ConfigError, Result};

/// Queue name for create-user messages (required)
pub const CREATE_USERS_QUEUE_VAR: &str = "CREATE_USERS_SQS_QUEUE";

/// `TRUE` turns on activity bracket messages
pub const SEND_ACTIVITY_VAR: &str = "SEND_BULK_ACTIVITY_MESSAGE";

/// Queue name for activity messages (required when enabled)
pub const ACTIVITY_QUEUE_VAR: &str = "BULK_ACTIVITY_SQS_QUEUE";

pub const AWS_REGION_VAR: &str = "AWS_REGION";
pub const AWS_ENDPOINT_VAR: &str = "AWS_ENDPOINT_URL";
pub const S3_PATH_STYLE_VAR: &str = "S3_PATH_STYLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub create_users_queue: String,
    /// `None` disables activity reporting
    pub activity_queue: Option<String>,
    pub aws: AwsConfig,
}

/// Client overrides, mostly for LocalStack or MinIO
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub s3_path_style: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&process_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let create_users_queue = env::required(lookup, CREATE_USERS_QUEUE_VAR)?;

        let activity_queue = if env::flag(lookup, SEND_ACTIVITY_VAR) {
            Some(env::required(lookup, ACTIVITY_QUEUE_VAR)?)
        } else {
            None
        };

        let aws = AwsConfig {
            region: lookup(AWS_REGION_VAR).filter(|v| !v.trim().is_empty()),
            endpoint: lookup(AWS_ENDPOINT_VAR).filter(|v| !v.trim().is_empty()),
            s3_path_style: env::parsed_or(lookup, S3_PATH_STYLE_VAR, false)?,
        };

        let config = Self {
            create_users_queue,
            activity_queue,
            aws,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn activity_enabled(&self) -> bool {
        self.activity_queue.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.aws.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::invalid(
                    AWS_ENDPOINT_VAR,
                    endpoint,
                    "endpoint must be an http(s) URL",
                ));
            }
        }
        Ok(())
    }
}

impl AwsConfig {
    /// Shared SDK configuration: default credential chain plus any overrides.
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        loader.load().await
    }

    pub fn s3_client(&self, sdk: &SdkConfig) -> aws_sdk_s3::Client {
        let config = aws_sdk_s3::config::Builder::from(sdk)
            .force_path_style(self.s3_path_style)
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }

    pub fn sqs_client(&self, sdk: &SdkConfig) -> aws_sdk_sqs::Client {
        aws_sdk_sqs::Client::new(sdk)
    }
}
