use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation errors for caller-supplied domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or digit: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid interval '{value}', expected one of 1min, 5min, 15min, 30min, 60min")]
    InvalidInterval { value: String },
    #[error("invalid endpoint '{value}'")]
    InvalidEndpoint { value: String },

    #[error("search keywords cannot be empty")]
    EmptyKeywords,
}

/// Classification of [`AlphaError`], used for exit codes and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaErrorKind {
    Configuration,
    Transport,
    Upstream,
    InvalidArgument,
    Parse,
    Io,
}

impl AlphaErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Upstream => "upstream",
            Self::InvalidArgument => "invalid_argument",
            Self::Parse => "parse",
            Self::Io => "io",
        }
    }
}

impl Display for AlphaErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for client operations.
#[derive(Debug, Error)]
pub enum AlphaError {
    /// Missing credentials, unusable proxy settings or an unreadable config file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every attempt failed before an HTTP response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered, but the payload is not usable data.
    #[error("upstream error (status {status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        body: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to parse payload: {0}")]
    Parse(String),

    /// Writing output failed, e.g. a closed stdout pipe.
    #[error("i/o error: {0}")]
    Io(String),
}

impl AlphaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn upstream(status: u16, message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub const fn kind(&self) -> AlphaErrorKind {
        match self {
            Self::Configuration(_) => AlphaErrorKind::Configuration,
            Self::Transport(_) => AlphaErrorKind::Transport,
            Self::Upstream { .. } => AlphaErrorKind::Upstream,
            Self::InvalidArgument(_) => AlphaErrorKind::InvalidArgument,
            Self::Parse(_) => AlphaErrorKind::Parse,
            Self::Io(_) => AlphaErrorKind::Io,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            AlphaErrorKind::Configuration => "alphaframe.configuration",
            AlphaErrorKind::Transport => "alphaframe.transport",
            AlphaErrorKind::Upstream => "alphaframe.upstream",
            AlphaErrorKind::InvalidArgument => "alphaframe.invalid_argument",
            AlphaErrorKind::Parse => "alphaframe.parse",
            AlphaErrorKind::Io => "alphaframe.io",
        }
    }

    /// Raw provider body for upstream failures.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::Upstream { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<ValidationError> for AlphaError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<csv::Error> for AlphaError {
    fn from(value: csv::Error) -> Self {
        if value.is_io_error() {
            Self::Io(format!("csv: {value}"))
        } else {
            Self::Parse(format!("csv: {value}"))
        }
    }
}

impl From<std::io::Error> for AlphaError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AlphaError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(format!("json: {value}"))
    }
}

impl From<serde_yaml::Error> for AlphaError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Configuration(format!("yaml: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_become_invalid_arguments() {
        let error = AlphaError::from(ValidationError::EmptySymbol);
        assert_eq!(error.kind(), AlphaErrorKind::InvalidArgument);
        assert_eq!(error.code(), "alphaframe.invalid_argument");
    }

    #[test]
    fn upstream_error_keeps_body_for_diagnostics() {
        let error = AlphaError::upstream(200, "payload too small", "{\"Note\": \"limit\"}");
        assert_eq!(error.upstream_body(), Some("{\"Note\": \"limit\"}"));
        assert!(error.to_string().contains("status 200"));
    }

    #[test]
    fn csv_io_failures_are_io_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let error = AlphaError::from(csv::Error::from(io));
        assert_eq!(error.kind(), AlphaErrorKind::Io);
        assert_eq!(error.code(), "alphaframe.io");
    }
}
