//! Authenticated session credentials.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an authenticated user as issued by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The user record embedded in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Credential bundle proving an authenticated identity.
///
/// Route gating only cares whether a session exists; the token fields are
/// carried so the backend client can authorise requests and persist the
/// session between page loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry as unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

fn default_token_type() -> String {
    String::from("bearer")
}

impl Session {
    /// Build a bearer session for `user_id` with no refresh token or expiry.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>, user_id: UserId, email: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_at: None,
            user: SessionUser { id: user_id, email },
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user.id
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    /// Sessions without an expiry never expire.
    #[must_use]
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now_secs)
    }

    /// Whether `other` belongs to the same signed-in identity.
    #[must_use]
    pub fn same_user(&self, other: &Self) -> bool {
        self.user.id == other.user.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive_and_optional() {
        let mut session = Session::bearer("tok", UserId::new("u1"), None);
        assert!(!session.is_expired(i64::MAX));
        session.expires_at = Some(100);
        assert!(session.is_expired(100));
        assert!(!session.is_expired(99));
    }

    #[test]
    fn persisted_json_fills_defaults() {
        let json = r#"{"access_token":"abc","user":{"id":"u-9"}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user_id().as_str(), "u-9");
        assert!(session.refresh_token.is_none());
        assert!(session.email().is_none());
    }
}
