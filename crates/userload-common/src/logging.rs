//! Logging Configuration and Initialization
//!
//! One place that installs the global `tracing` subscriber for every userload binary.
//! Settings come from a base [`LogConfig`] (usually built by the binary) overlaid with
//! `LOG_*` environment variables:
//!
//! - `LOG_LEVEL`: trace, debug, info, warn, error
//! - `LOG_FORMAT`: text or json (json suits CloudWatch Logs Insights)
//! - `LOG_OUTPUT`: console, file or both
//! - `LOG_DIR` / `LOG_FILE_PREFIX`: daily rolled file location
//! - `LOG_FILTER`: extra directives such as `aws_smithy_runtime=warn`
//! - `LOG_ANSI`, `LOG_INCLUDE_LOCATION`, `LOG_INCLUDE_TARGETS`: booleans
//!
//! Use structured fields rather than formatted strings:
//!
//! ```rust
//! use tracing::info;
//!
//! let bucket = "uploads";
//! let processed = 2;
//! info!(%bucket, processed, "Process finished");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use userload_common::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env_with(LogConfig::builder().log_file_prefix("userload").build())?;
//! let _guard = init_logging(&config)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::env::{self, process_lookup};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl std::str::FromStr for LogOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(ConfigError::invalid("LOG_OUTPUT", s, "expected console, file or both")),
        }
    }
}

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::invalid("LOG_FORMAT", s, "expected text or json")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub output: LogOutput,
    pub format: LogFormat,
    pub log_dir: PathBuf,
    /// e.g. "userload" -> "userload.2024-01-18"
    pub log_file_prefix: String,
    /// Comma separated directives appended to the level filter
    pub filter_directives: Option<String>,
    pub ansi: bool,
    pub include_location: bool,
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "userload".to_string(),
            filter_directives: None,
            ansi: true,
            include_location: false,
            include_targets: true,
        }
    }
}

impl LogConfig {
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_env_with(Self::default())
    }

    /// `base` overlaid with the process environment; environment values win.
    pub fn from_env_with(base: Self) -> crate::Result<Self> {
        Self::from_lookup(base, &process_lookup)
    }

    pub fn from_lookup<F>(base: Self, lookup: &F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base;

        if let Some(level) = lookup("LOG_LEVEL") {
            config.level = level
                .parse()
                .map_err(|_| ConfigError::invalid("LOG_LEVEL", &level, "unknown level"))?;
        }
        if let Some(output) = lookup("LOG_OUTPUT") {
            config.output = output.parse()?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("LOG_FILE_PREFIX") {
            config.log_file_prefix = prefix;
        }
        if let Some(filter) = lookup("LOG_FILTER") {
            config.filter_directives = Some(filter);
        }
        config.ansi = env::parsed_or(lookup, "LOG_ANSI", config.ansi)?;
        config.include_location =
            env::parsed_or(lookup, "LOG_INCLUDE_LOCATION", config.include_location)?;
        config.include_targets =
            env::parsed_or(lookup, "LOG_INCLUDE_TARGETS", config.include_targets)?;

        Ok(config)
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::from_default_env().add_directive(self.level.into());
        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',').filter(|d| !d.trim().is_empty()) {
                filter = filter.add_directive(
                    directive
                        .trim()
                        .parse()
                        .with_context(|| format!("Failed to parse filter directive {directive}"))?,
                );
            }
        }
        Ok(filter)
    }
}

#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn ansi(mut self, ansi: bool) -> Self {
        self.config.ansi = ansi;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Install the global subscriber.
///
/// Call once at startup. When file output is enabled the returned guard flushes the
/// background writer on drop, so keep it alive for the lifetime of the process.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.output.console() {
        layers.push(fmt_layer(config, std::io::stdout, config.ansi));
    }

    if config.output.file() {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(config, writer, false));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(config.env_filter()?)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    Ok(guard)
}

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(config.include_targets)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
