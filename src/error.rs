//! Error types shared by the poller, session engine and scheduler

use thiserror::Error;

/// Coarse classification used as the hint in failure log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Config,
    TransientNetwork,
    Protocol,
    Timeout,
    ServerDeclared,
}

impl ErrorClass {
    pub fn value(&self) -> &'static str {
        match self {
            ErrorClass::Config => "config",
            ErrorClass::TransientNetwork => "network",
            ErrorClass::Protocol => "protocol",
            ErrorClass::Timeout => "timeout",
            ErrorClass::ServerDeclared => "server",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Error)]
pub enum FishingError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("inventory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl FishingError {
    pub fn config(msg: impl Into<String>) -> Self {
        FishingError::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorClass {
        match self {
            FishingError::Config(_) => ErrorClass::Config,
            FishingError::Http(_) | FishingError::Connect(_) => ErrorClass::TransientNetwork,
            FishingError::Protocol(_) => ErrorClass::Protocol,
        }
    }

    /// Only configuration problems are allowed to stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, FishingError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, FishingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(FishingError::config("x").kind(), ErrorClass::Config);
        assert_eq!(
            FishingError::Protocol("bad".into()).kind().value(),
            "protocol"
        );
        assert_eq!(ErrorClass::Timeout.to_string(), "timeout");
        assert_eq!(ErrorClass::ServerDeclared.value(), "server");
    }

    #[test]
    fn test_only_config_is_fatal() {
        assert!(FishingError::config("empty token file").is_fatal());
        assert!(!FishingError::Protocol("bad".into()).is_fatal());
    }
}
