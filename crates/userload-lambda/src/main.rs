//! Userload - S3 CSV to SQS create-user messages

use anyhow::Result;
use clap::Parser;
use lambda_runtime::{service_fn, LambdaEvent};
use std::sync::Arc;
use tracing::{error, info, Level};
use userload_common::logging::{init_logging, LogConfig};
use userload_lambda::{
    config::Config,
    handler::{handle_event, TriggerEvent},
    processor::FileProcessor,
};

#[derive(Parser, Debug)]
#[command(name = "userload")]
#[command(author, version, about = "Publish create-user messages for CSV uploads")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Serve S3 notifications through the Lambda runtime (default)
    Lambda,

    /// Process a single object and exit
    Process {
        /// Bucket holding the upload
        #[arg(short, long)]
        bucket: String,

        /// Object key, e.g. test/create-users/<realm>/<file>.csv
        #[arg(short, long)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let base = LogConfig::builder()
        .level(level)
        .log_file_prefix("userload")
        .filter_directives("aws_smithy_runtime=warn,aws_config=warn,hyper=warn")
        .build();
    let log_config = LogConfig::from_env_with(base)?;
    let _guard = init_logging(&log_config)?;

    let config = Config::from_env()?;
    let processor = FileProcessor::from_config(&config).await?;
    info!(
        queue = %config.create_users_queue,
        activity = processor.activity_enabled(),
        "Processor ready"
    );

    match cli.command.unwrap_or(Command::Lambda) {
        Command::Lambda => {
            let processor = Arc::new(processor);
            lambda_runtime::run(service_fn(move |event: LambdaEvent<TriggerEvent>| {
                let processor = Arc::clone(&processor);
                async move {
                    handle_event(&processor, event.payload)
                        .await
                        .map_err(lambda_runtime::Error::from)
                }
            }))
            .await
            .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {e}"))?;
        }
        Command::Process { bucket, key } => match processor.process(&bucket, &key).await {
            Ok(processed) => {
                info!("Process [{bucket}/{key}] finished, processed [{processed}] records")
            }
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Process [{bucket}/{key}] failed");
                return Err(e.into());
            }
        },
    }

    Ok(())
}
