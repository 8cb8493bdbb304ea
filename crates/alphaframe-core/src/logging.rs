//! Subscriber setup for binaries. The library itself only emits `tracing`
//! events and never installs a subscriber.

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::AlphaError;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, colored.
    Pretty,
    Json,
    /// One line per event.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = AlphaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(AlphaError::configuration(format!(
                "unknown log format '{s}', expected pretty, json or compact"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `alphaframe_core=debug`.
    pub level: String,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: LogFormat::default(),
            with_target: true,
            with_thread_ids: false,
        }
    }
}

impl LogConfig {
    /// Accepts the upper-case level names used in config files (`INFO`,
    /// `WARNING`, `CRITICAL`) as well as plain filter directives.
    pub fn new(level: impl Into<String>) -> Self {
        let level: String = level.into();
        Self {
            level: level_directive(&level),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

fn level_directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warning" => String::from("warn"),
        "critical" | "fatal" => String::from("error"),
        "notset" => String::from("trace"),
        _ => level,
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `config.level`.
/// Logs go to stderr so table output on stdout stays clean.
pub fn init_logging(config: &LogConfig) -> Result<(), AlphaError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            AlphaError::configuration(format!("invalid log level '{}': {e}", config.level))
        })?;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };
    installed.map_err(|e| {
        AlphaError::configuration(format!("failed to install log subscriber: {e}"))
    })
}
