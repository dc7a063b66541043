use std::fmt;
use thiserror::Error;

/// The error type for blobgate operations.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of failure that occurred.
///
/// The set is closed on purpose: the request handler maps each kind to an
/// HTTP status with one exhaustive match, so adding a kind here forces the
/// boundary mapping to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The vault could not be reached at all (network or service failure).
    VaultUnreachable,

    /// The ambient identity was rejected by the vault, or none was available.
    VaultAuthDenied,

    /// The vault answered but holds no secret under the requested name.
    SecretNotFound,

    /// The stored secret is not a well-formed connection string.
    MalformedCredential,

    /// The cryptographic signing step failed (e.g. undecodable key bytes).
    SigningFailure,

    /// The container resource cannot be resolved with the given credential.
    ContainerNotAccessible,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the human-readable message attached at the failing stage.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this failure belongs to the vault access class.
    pub fn is_vault_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::VaultUnreachable | ErrorKind::VaultAuthDenied | ErrorKind::SecretNotFound
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a vault unreachable error.
    pub fn vault_unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VaultUnreachable, message)
    }

    /// Create a vault auth denied error.
    pub fn vault_auth_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VaultAuthDenied, message)
    }

    /// Create a secret not found error.
    pub fn secret_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SecretNotFound, message)
    }

    /// Create a malformed credential error.
    ///
    /// The message must describe the structural problem only; callers must
    /// never include the raw secret content.
    pub fn malformed_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedCredential, message)
    }

    /// Create a signing failure error.
    pub fn signing_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SigningFailure, message)
    }

    /// Create a container not accessible error.
    pub fn container_not_accessible(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ContainerNotAccessible, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::VaultUnreachable => write!(f, "vault unreachable"),
            ErrorKind::VaultAuthDenied => write!(f, "vault access denied"),
            ErrorKind::SecretNotFound => write!(f, "secret not found"),
            ErrorKind::MalformedCredential => write!(f, "malformed credential"),
            ErrorKind::SigningFailure => write!(f, "signing failure"),
            ErrorKind::ContainerNotAccessible => write!(f, "container not accessible"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::vault_unreachable(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_error_class() {
        assert!(Error::vault_unreachable("x").is_vault_error());
        assert!(Error::vault_auth_denied("x").is_vault_error());
        assert!(Error::secret_not_found("x").is_vault_error());
        assert!(!Error::malformed_credential("x").is_vault_error());
        assert!(!Error::signing_failure("x").is_vault_error());
        assert!(!Error::container_not_accessible("x").is_vault_error());
    }

    #[test]
    fn test_display_carries_kind_and_message() {
        let err = Error::secret_not_found("no secret named storageConnectionString");
        assert_eq!(
            err.to_string(),
            "secret not found: no secret named storageConnectionString"
        );
        assert_eq!(err.kind(), ErrorKind::SecretNotFound);
    }
}
