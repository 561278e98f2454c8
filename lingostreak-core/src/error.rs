//! Error taxonomy shared by the backend contract and the session store.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendErrorKind {
    InvalidCredentials,
    EmailNotConfirmed,
    UserAlreadyExists,
    WeakPassword,
    InvalidInput,
    RateLimited,
    Unauthorized,
    NotFound,
    Network,
    Server,
}

impl BackendErrorKind {
    /// Failures caused by what the user typed rather than by the service.
    #[must_use]
    pub const fn is_rejection(self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::EmailNotConfirmed
                | Self::UserAlreadyExists
                | Self::WeakPassword
                | Self::InvalidInput
        )
    }
}

/// Typed error returned by every backend operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    #[must_use]
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Server, message)
    }

    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            BackendErrorKind::InvalidCredentials,
            "Invalid login credentials",
        )
    }
}

/// What the auth screens see when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Bad credentials, unconfirmed account or invalid input.
    #[error("{0}")]
    Rejected(String),
    /// The service could not be reached or failed.
    #[error("{0}")]
    Unavailable(String),
    #[error("you need to sign in first")]
    NotSignedIn,
}

impl AuthFailure {
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl From<BackendError> for AuthFailure {
    fn from(err: BackendError) -> Self {
        if err.kind.is_rejection() {
            Self::Rejected(err.message)
        } else {
            Self::Unavailable(err.message)
        }
    }
}

impl From<crate::profile::ProfileError> for AuthFailure {
    fn from(err: crate::profile::ProfileError) -> Self {
        Self::Rejected(err.to_string())
    }
}

/// Raised when a profile was found without a session; the store resets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("profile for {user} survived without a session; state was reset")]
pub struct IntegrityViolation {
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_split_into_rejected_and_unavailable() {
        let rejected: AuthFailure = BackendError::invalid_credentials().into();
        assert_eq!(
            rejected,
            AuthFailure::Rejected("Invalid login credentials".into())
        );
        assert!(rejected.is_rejection());

        let offline: AuthFailure = BackendError::network("Failed to fetch").into();
        assert_eq!(offline.message(), "Failed to fetch");
        assert!(!offline.is_rejection());

        let unconfirmed = BackendError::new(BackendErrorKind::EmailNotConfirmed, "Email not confirmed");
        assert!(AuthFailure::from(unconfirmed).is_rejection());
        assert!(!BackendErrorKind::RateLimited.is_rejection());
    }
}
