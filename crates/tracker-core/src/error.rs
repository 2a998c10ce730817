use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{operation} exited with {status}: {stderr}")]
    Command {
        operation: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Failed to parse {operation} output: {reason}")]
    Parse {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Stable label used for log fields and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::MissingEnvVar(_) | TrackerError::InvalidConfig(_) => "config",
            TrackerError::Command { .. } => "command",
            TrackerError::Parse { .. } => "parse",
            TrackerError::Timeout { .. } => "timeout",
            TrackerError::Dispatch(_) => "dispatch",
            TrackerError::Registry(_) => "registry",
            TrackerError::Checkpoint(_) => "checkpoint",
            TrackerError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let command = TrackerError::Command {
            operation: "GetSelectedTipHash",
            status: "exit status: 1".to_string(),
            stderr: "connection refused".to_string(),
        };
        assert_eq!(command.kind(), "command");
        assert_eq!(
            command.to_string(),
            "GetSelectedTipHash exited with exit status: 1: connection refused"
        );

        let timeout = TrackerError::Timeout {
            operation: "GetBlock",
            after: Duration::from_secs(10),
        };
        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(TrackerError::Registry("x".into()).kind(), "registry");
    }
}
