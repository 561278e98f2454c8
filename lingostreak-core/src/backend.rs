//! Contract with the remote auth/data service.
//!
//! The service is opaque: implementations exist for the hosted backend (in the
//! web crate) and for an in-memory stand-in ([`crate::memory::InMemoryBackend`]).
//! All calls run on a single-threaded executor, so the trait is `?Send`.
use crate::error::BackendError;
use crate::profile::{PublicProfile, UserProfile};
use crate::session::{Session, UserId};
use async_trait::async_trait;
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};

/// Kind of auth-state notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Auth-state change pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    #[must_use]
    pub const fn signed_in(session: Session) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            session: Some(session),
        }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            session: None,
        }
    }

    #[must_use]
    pub const fn refreshed(session: Session) -> Self {
        Self {
            kind: AuthEventKind::TokenRefreshed,
            session: Some(session),
        }
    }

    /// Session carried by the event, ignoring any payload on sign-out.
    #[must_use]
    pub fn effective_session(&self) -> Option<&Session> {
        match self.kind {
            AuthEventKind::SignedOut => None,
            _ => self.session.as_ref(),
        }
    }
}

/// Sending half handed to [`AuthBackend::subscribe`].
pub type AuthEventSender = mpsc::UnboundedSender<AuthEvent>;
/// Receiving half consumed by the session store, in delivery order.
pub type AuthEvents = mpsc::UnboundedReceiver<AuthEvent>;

#[must_use]
pub fn auth_channel() -> (AuthEventSender, AuthEvents) {
    mpsc::unbounded()
}

/// Result of a sign-up call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// Account created; a confirmation email must be followed before signing in.
    ConfirmationPending { email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

#[async_trait(?Send)]
pub trait AuthBackend {
    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns a rejection for bad credentials or an unconfirmed account and a
    /// network/server error when the service cannot answer.
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, BackendError>;

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns a rejection for duplicate accounts or weak passwords.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError>;

    /// Start a redirect-based OAuth flow. The session, if any, arrives later as
    /// an [`AuthEvent`].
    ///
    /// # Errors
    ///
    /// Returns an error when the redirect cannot be started.
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<(), BackendError>;

    /// Revoke the current session remotely and forget it locally.
    ///
    /// # Errors
    ///
    /// Returns an error when the remote revoke fails; the local copy is gone
    /// either way.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Session saved by a previous run, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the saved session cannot be read or refreshed.
    async fn persisted_session(&self) -> Result<Option<Session>, BackendError>;

    /// Profile for the signed-in user; `Ok(None)` when onboarding never ran.
    ///
    /// # Errors
    ///
    /// Returns an error when the profile store cannot be reached.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError>;

    /// Insert or update the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns a rejection when the username is taken.
    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile, BackendError>;

    /// Public view of another user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error when the profile store cannot be reached.
    async fn fetch_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, BackendError>;

    /// Register for auth-state notifications for the rest of the process.
    fn subscribe(&self, events: AuthEventSender);
}
