use alphaframe_core::{AlphaError, AlphaErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] alphaframe_core::ValidationError),

    #[error(transparent)]
    Client(#[from] AlphaError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Client(error) => match error.kind() {
                AlphaErrorKind::InvalidArgument => 2,
                AlphaErrorKind::Configuration => 3,
                AlphaErrorKind::Transport => 4,
                AlphaErrorKind::Upstream => 5,
                AlphaErrorKind::Parse => 6,
                AlphaErrorKind::Io => 10,
            },
            Self::Serialization(_) => 7,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::from(alphaframe_core::ValidationError::EmptySymbol).exit_code(), 2);
        assert_eq!(CliError::from(AlphaError::configuration("no keys")).exit_code(), 3);
        assert_eq!(CliError::from(AlphaError::transport("dns")).exit_code(), 4);
        assert_eq!(CliError::from(AlphaError::upstream(200, "too small", "{}")).exit_code(), 5);
        assert_eq!(CliError::from(AlphaError::parse("bad cell")).exit_code(), 6);
        assert_eq!(CliError::from(AlphaError::io("closed pipe")).exit_code(), 10);
    }
}
