//! Error types for the role catalog

use thiserror::Error;

/// Role catalog errors
#[derive(Debug, Error)]
pub enum RoleError {
    /// No usable credential (not signed in, token issuance failed)
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Transport failure, timeout or non-success status from the provider
    #[error("Role provider request failed: {0}")]
    Fetch(String),

    /// Malformed provider payload
    #[error("Malformed role payload: {0}")]
    Parse(String),

    /// The CLI fallback is missing or failed
    #[error("Azure CLI unavailable: {0}")]
    CliUnavailable(String),

    /// Scope path rejected
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RoleError {
    /// Whether the error is recovered by switching to the CLI fallback
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Parse(_))
    }
}

impl Clone for RoleError {
    fn clone(&self) -> Self {
        match self {
            Self::AuthRequired(msg) => Self::AuthRequired(msg.clone()),
            Self::Fetch(msg) => Self::Fetch(msg.clone()),
            Self::Parse(msg) => Self::Parse(msg.clone()),
            Self::CliUnavailable(msg) => Self::CliUnavailable(msg.clone()),
            Self::InvalidScope(msg) => Self::InvalidScope(msg.clone()),
            Self::Internal(msg) => Self::Internal(msg.clone()),
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

/// Result type for role catalog operations
pub type Result<T> = std::result::Result<T, RoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_provider_failures_trigger_fallback() {
        assert!(RoleError::Fetch("503".into()).triggers_fallback());
        assert!(RoleError::Parse("eof".into()).triggers_fallback());
        assert!(!RoleError::AuthRequired("no token".into()).triggers_fallback());
        assert!(!RoleError::CliUnavailable("missing".into()).triggers_fallback());
    }

    #[test]
    fn test_clone_keeps_variant_and_message() {
        let io = RoleError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "az"));
        match io.clone() {
            RoleError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected variant: {:?}", other),
        }

        let fetch = RoleError::CliUnavailable("timed out".into());
        assert_eq!(fetch.clone().to_string(), fetch.to_string());
    }
}
