//! Scripted in-process backend.
//!
//! Backs the demo build, the logic tester and the store tests. Every knob that
//! matters to the gate is exposed: confirmation requirement, offline mode,
//! failing or held profile fetches, and injected auth events.
use crate::backend::{AuthBackend, AuthEvent, AuthEventSender, OAuthProvider, SignUpOutcome};
use crate::error::{BackendError, BackendErrorKind};
use crate::profile::{DEFAULT_DAILY_GOAL_MINUTES, PublicProfile, UserProfile};
use crate::session::{Session, UserId};
use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::HashMap;

pub const DEMO_PASSWORD: &str = "secret1";
pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PUBLIC_EMAIL: &str = "alice@example.com";
pub const DEMO_PUBLIC_USERNAME: &str = "alice";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    profiles: HashMap<UserId, UserProfile>,
    persisted: Option<Session>,
    subscribers: Vec<AuthEventSender>,
    offline: bool,
    require_confirmation: bool,
    failing_profile_fetches: u32,
    failing_restore: Option<BackendError>,
    hold_profile_fetches: bool,
    held: Vec<oneshot::Sender<()>>,
    oauth_email: Option<String>,
    next_user: u64,
    next_token: u64,
    sign_out_calls: u32,
    profile_fetches: u32,
}

impl Inner {
    fn ensure_online(&self) -> Result<(), BackendError> {
        if self.offline {
            Err(BackendError::network("Failed to fetch"))
        } else {
            Ok(())
        }
    }

    fn create_account(&mut self, email: &str, password: &str, confirmed: bool) -> UserId {
        self.next_user += 1;
        let user_id = UserId::new(format!("user-{}", self.next_user));
        self.accounts.insert(
            normalize_email(email),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
                confirmed,
            },
        );
        user_id
    }

    fn issue_session(&mut self, user_id: UserId, email: &str) -> Session {
        self.next_token += 1;
        let mut session = Session::bearer(
            format!("access-{}", self.next_token),
            user_id,
            Some(normalize_email(email)),
        );
        session.refresh_token = Some(format!("refresh-{}", self.next_token));
        self.persisted = Some(session.clone());
        session
    }

    fn emit(&mut self, event: &AuthEvent) {
        self.subscribers
            .retain(|sender| sender.unbounded_send(event.clone()).is_ok());
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory [`AuthBackend`].
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: RefCell<Inner>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts used by the demo build and the browser scenarios:
    /// `user@example.com` without a profile, `alice@example.com` with a
    /// public profile, and Google sign-in for `alice`.
    #[must_use]
    pub fn demo() -> Self {
        Self::new()
            .with_account(DEMO_EMAIL, DEMO_PASSWORD)
            .with_onboarded_account(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD, DEMO_PUBLIC_USERNAME, "es")
            .with_oauth_account(DEMO_PUBLIC_EMAIL)
    }

    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.inner.borrow_mut().create_account(email, password, true);
        self
    }

    /// Account with a completed profile.
    #[must_use]
    pub fn with_onboarded_account(
        self,
        email: &str,
        password: &str,
        username: &str,
        target_language: &str,
    ) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            let user_id = inner.create_account(email, password, true);
            inner.profiles.insert(
                user_id.clone(),
                UserProfile {
                    id: user_id,
                    username: username.to_string(),
                    display_name: None,
                    target_language: Some(target_language.to_string()),
                    native_language: None,
                    daily_goal_minutes: Some(DEFAULT_DAILY_GOAL_MINUTES),
                    onboarding_complete: true,
                    avatar_url: None,
                },
            );
        }
        self
    }

    #[must_use]
    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.inner
            .borrow_mut()
            .profiles
            .insert(profile.id.clone(), profile);
        self
    }

    /// Pretend a previous visit left a signed-in session for `email`.
    #[must_use]
    pub fn with_persisted_session(self, email: &str) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            let user_id = inner
                .accounts
                .get(&normalize_email(email))
                .map(|account| account.user_id.clone());
            match user_id {
                Some(user_id) => {
                    inner.issue_session(user_id, email);
                }
                None => log::warn!("no account for {email}; nothing persisted"),
            }
        }
        self
    }

    /// The persisted-session lookup fails with `err`, as a rejected OAuth
    /// callback does.
    #[must_use]
    pub fn with_failing_restore(self, err: BackendError) -> Self {
        self.inner.borrow_mut().failing_restore = Some(err);
        self
    }

    /// New sign-ups must confirm their email before signing in.
    #[must_use]
    pub fn requiring_confirmation(self) -> Self {
        self.inner.borrow_mut().require_confirmation = true;
        self
    }

    /// Google sign-in completes as `email`, creating the account if needed.
    #[must_use]
    pub fn with_oauth_account(self, email: &str) -> Self {
        self.inner.borrow_mut().oauth_email = Some(normalize_email(email));
        self
    }

    #[must_use]
    pub fn user_id_for(&self, email: &str) -> Option<UserId> {
        self.inner
            .borrow()
            .accounts
            .get(&normalize_email(email))
            .map(|account| account.user_id.clone())
    }

    /// Mark a pending account as confirmed.
    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = self.inner.borrow_mut().accounts.get_mut(&normalize_email(email)) {
            account.confirmed = true;
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// The next `count` profile fetches fail with a server error.
    pub fn fail_next_profile_fetches(&self, count: u32) {
        self.inner.borrow_mut().failing_profile_fetches = count;
    }

    /// Park profile fetches until [`InMemoryBackend::release_profile_fetches`].
    pub fn hold_profile_fetches(&self) {
        self.inner.borrow_mut().hold_profile_fetches = true;
    }

    /// Let every parked fetch answer and stop parking new ones.
    pub fn release_profile_fetches(&self) {
        let held = {
            let mut inner = self.inner.borrow_mut();
            inner.hold_profile_fetches = false;
            std::mem::take(&mut inner.held)
        };
        for waiter in held {
            let _ = waiter.send(());
        }
    }

    #[must_use]
    pub fn held_profile_fetches(&self) -> usize {
        self.inner.borrow().held.len()
    }

    #[must_use]
    pub fn profile_fetches(&self) -> u32 {
        self.inner.borrow().profile_fetches
    }

    #[must_use]
    pub fn sign_out_calls(&self) -> u32 {
        self.inner.borrow().sign_out_calls
    }

    #[must_use]
    pub fn persisted(&self) -> Option<Session> {
        self.inner.borrow().persisted.clone()
    }

    #[must_use]
    pub fn stored_profile(&self, user_id: &UserId) -> Option<UserProfile> {
        self.inner.borrow().profiles.get(user_id).cloned()
    }

    /// Deliver `event` to every subscriber, as if it came from another tab or
    /// the token refresher.
    pub fn push_event(&self, event: &AuthEvent) {
        self.inner.borrow_mut().emit(event);
    }
}

#[async_trait(?Send)]
impl AuthBackend for InMemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_online()?;
        let account = inner
            .accounts
            .get(&normalize_email(email))
            .filter(|account| account.password == password)
            .cloned()
            .ok_or_else(BackendError::invalid_credentials)?;
        if !account.confirmed {
            return Err(BackendError::new(
                BackendErrorKind::EmailNotConfirmed,
                "Email not confirmed",
            ));
        }
        let session = inner.issue_session(account.user_id, email);
        inner.emit(&AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_online()?;
        if inner.accounts.contains_key(&normalize_email(email)) {
            return Err(BackendError::new(
                BackendErrorKind::UserAlreadyExists,
                "User already registered",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::new(
                BackendErrorKind::WeakPassword,
                format!("Password should be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        let confirmed = !inner.require_confirmation;
        let user_id = inner.create_account(email, password, confirmed);
        if !confirmed {
            return Ok(SignUpOutcome::ConfirmationPending {
                email: normalize_email(email),
            });
        }
        let session = inner.issue_session(user_id, email);
        inner.emit(&AuthEvent::signed_in(session.clone()));
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        _redirect_to: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_online()?;
        let email = inner.oauth_email.clone().ok_or_else(|| {
            BackendError::new(
                BackendErrorKind::InvalidInput,
                format!("Unsupported provider: {} is not enabled", provider.as_str()),
            )
        })?;
        let existing = inner.accounts.get(&email).map(|a| a.user_id.clone());
        let user_id = match existing {
            Some(user_id) => user_id,
            None => inner.create_account(&email, "", true),
        };
        // The redirect round trip completes immediately; the session arrives
        // as a notification only.
        let session = inner.issue_session(user_id, &email);
        inner.emit(&AuthEvent::signed_in(session));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut inner = self.inner.borrow_mut();
        inner.sign_out_calls += 1;
        inner.persisted = None;
        inner.emit(&AuthEvent::signed_out());
        inner.ensure_online()
    }

    async fn persisted_session(&self) -> Result<Option<Session>, BackendError> {
        let mut inner = self.inner.borrow_mut();
        match inner.failing_restore.take() {
            Some(err) => Err(err),
            None => Ok(inner.persisted.clone()),
        }
    }

    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        let parked = {
            let mut inner = self.inner.borrow_mut();
            inner.profile_fetches += 1;
            inner.ensure_online()?;
            if inner.hold_profile_fetches {
                let (tx, rx) = oneshot::channel();
                inner.held.push(tx);
                Some(rx)
            } else {
                None
            }
        };
        if let Some(rx) = parked {
            // A dropped sender also releases the fetch.
            let _ = rx.await;
        }
        let mut inner = self.inner.borrow_mut();
        if inner.failing_profile_fetches > 0 {
            inner.failing_profile_fetches -= 1;
            return Err(BackendError::server("profile service unavailable"));
        }
        Ok(inner.profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile, BackendError> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_online()?;
        let taken = inner
            .profiles
            .values()
            .any(|other| other.username == profile.username && other.id != profile.id);
        if taken {
            return Err(BackendError::new(
                BackendErrorKind::UserAlreadyExists,
                "That username is already taken",
            ));
        }
        inner.profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn fetch_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, BackendError> {
        let inner = self.inner.borrow();
        inner.ensure_online()?;
        let username = username.trim().to_lowercase();
        Ok(inner
            .profiles
            .values()
            .find(|profile| profile.username == username && profile.is_onboarded())
            .map(UserProfile::public_view))
    }

    fn subscribe(&self, events: AuthEventSender) {
        self.inner.borrow_mut().subscribers.push(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthEventKind, auth_channel};
    use futures::StreamExt;
    use futures::executor::block_on;

    #[test]
    fn password_sign_in_rules() {
        let backend = InMemoryBackend::demo().requiring_confirmation();
        block_on(async {
            let err = backend
                .sign_in_with_password(DEMO_EMAIL, "wrong")
                .await
                .unwrap_err();
            assert_eq!(err.kind, BackendErrorKind::InvalidCredentials);

            let outcome = backend.sign_up("new@example.com", "secret1", None).await.unwrap();
            assert!(matches!(outcome, SignUpOutcome::ConfirmationPending { .. }));
            let err = backend
                .sign_in_with_password("new@example.com", "secret1")
                .await
                .unwrap_err();
            assert_eq!(err.kind, BackendErrorKind::EmailNotConfirmed);
            backend.confirm_email("new@example.com");
            assert!(backend.sign_in_with_password("NEW@example.com", "secret1").await.is_ok());
        });
    }

    #[test]
    fn sign_in_and_out_emit_events() {
        let backend = InMemoryBackend::demo();
        let (tx, mut rx) = auth_channel();
        backend.subscribe(tx);
        block_on(async {
            backend.sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
            backend.sign_out().await.unwrap();
            assert_eq!(rx.next().await.unwrap().kind, AuthEventKind::SignedIn);
            assert_eq!(rx.next().await.unwrap().kind, AuthEventKind::SignedOut);
        });
        assert!(backend.persisted().is_none());
        assert_eq!(backend.sign_out_calls(), 1);
    }

    #[test]
    fn offline_and_failing_fetches() {
        let backend = InMemoryBackend::demo();
        let alice = backend.user_id_for(DEMO_PUBLIC_EMAIL).unwrap();
        block_on(async {
            backend.fail_next_profile_fetches(1);
            assert!(backend.fetch_profile(&alice).await.is_err());
            assert!(backend.fetch_profile(&alice).await.unwrap().is_some());
            backend.set_offline(true);
            let err = backend.fetch_public_profile("alice").await.unwrap_err();
            assert_eq!(err.kind, BackendErrorKind::Network);
        });
        assert_eq!(backend.profile_fetches(), 2);
    }

    #[test]
    fn usernames_are_unique() {
        let backend = InMemoryBackend::demo();
        let user = backend.user_id_for(DEMO_EMAIL).unwrap();
        let mut profile = backend
            .stored_profile(&backend.user_id_for(DEMO_PUBLIC_EMAIL).unwrap())
            .unwrap();
        profile.id = user;
        let err = block_on(backend.save_profile(&profile)).unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::UserAlreadyExists);
    }
}
