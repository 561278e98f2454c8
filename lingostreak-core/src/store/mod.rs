//! Session store: the single owner of session, profile, load latch and theme.
//!
//! `SessionStore` is a cheap, clonable handle. Screens read
//! [`SessionStore::snapshot`] or register a listener, and request changes
//! through the async operations below. Nothing else mutates the state.
mod state;

pub use state::{Generation, ProfileRequest, SessionAction, SessionSnapshot, SessionState};

use crate::backend::{AuthBackend, AuthEvents, OAuthProvider, SignUpOutcome, auth_channel};
use crate::error::AuthFailure;
use crate::profile::{ProfileDraft, PublicProfile, UserProfile};
use crate::session::Session;
use crate::theme::ThemeMode;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Clone)]
pub struct SessionStore {
    backend: Rc<dyn AuthBackend>,
    state: Rc<RefCell<SessionState>>,
    listeners: Rc<RefCell<Vec<(ListenerId, Listener)>>>,
    next_listener: Rc<Cell<u64>>,
    /// Set when an integrity reset cleared local state; the backend session
    /// is revoked on the next async step.
    revoke_pending: Rc<Cell<bool>>,
    redirect_to: Option<Rc<str>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state.borrow().snapshot())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for SessionStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(backend: Rc<dyn AuthBackend>, theme: ThemeMode) -> Self {
        Self {
            backend,
            state: Rc::new(RefCell::new(SessionState::new(theme))),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Rc::new(Cell::new(0)),
            revoke_pending: Rc::new(Cell::new(false)),
            redirect_to: None,
        }
    }

    /// Where sign-up confirmation links and OAuth redirects should land.
    #[must_use]
    pub fn with_redirect_to(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(Rc::from(redirect_to.into()));
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().snapshot().clone()
    }

    #[must_use]
    pub fn backend(&self) -> Rc<dyn AuthBackend> {
        Rc::clone(&self.backend)
    }

    /// Call `listener` after every change to the snapshot.
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    /// Apply an action and notify listeners if anything visible changed.
    pub fn dispatch(&self, action: SessionAction) -> Option<ProfileRequest> {
        let (request, changed) = {
            let mut state = self.state.borrow_mut();
            let before = state.snapshot().clone();
            let request = state.apply(action);
            if state.last_violation().is_some() {
                self.revoke_pending.set(true);
            }
            let changed = before != *state.snapshot();
            (request, changed.then(|| state.snapshot().clone()))
        };
        if let Some(snapshot) = changed {
            self.notify(&snapshot);
        }
        request
    }

    fn notify(&self, snapshot: &SessionSnapshot) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    async fn revoke_after_reset(&self) {
        if !self.revoke_pending.replace(false) {
            return;
        }
        log::info!("revoking backend session after integrity reset");
        if let Err(err) = self.backend.sign_out().await {
            log::warn!("could not revoke session after integrity reset: {err}");
        }
    }

    fn begin_request(&self) -> Generation {
        self.state.borrow_mut().begin_request()
    }

    /// Subscribe to auth notifications, then resolve the persisted session.
    ///
    /// Events that arrive while the lookup is in flight stay queued and are
    /// applied afterwards by [`SessionStore::run`].
    pub async fn bootstrap(&self) -> AuthEvents {
        let (sender, events) = auth_channel();
        self.backend.subscribe(sender);
        let request = self.begin_request();
        let result = self.backend.persisted_session().await;
        if let Some(fetch) = self.dispatch(SessionAction::Restored { request, result }) {
            self.load_profile(fetch).await;
        }
        self.revoke_after_reset().await;
        events
    }

    /// Apply auth notifications in delivery order until the backend drops the
    /// channel. Profile fetches run concurrently so a sign-out is never queued
    /// behind a slow fetch.
    pub async fn run(&self, mut events: AuthEvents) {
        let mut fetches = FuturesUnordered::new();
        loop {
            futures::select! {
                event = events.next() => match event {
                    Some(event) => {
                        if let Some(fetch) = self.dispatch(SessionAction::AuthChanged(event)) {
                            fetches.push(self.load_profile(fetch));
                        }
                        self.revoke_after_reset().await;
                    }
                    None => break,
                },
                () = fetches.select_next_some() => {}
            }
        }
        log::debug!("auth event channel closed");
        while fetches.next().await.is_some() {}
    }

    /// [`SessionStore::bootstrap`] followed by [`SessionStore::run`].
    pub async fn launch(&self) {
        let events = self.bootstrap().await;
        self.run(events).await;
    }

    /// Apply whatever notifications are already queued, without waiting for
    /// more. Returns how many were applied.
    pub async fn process_pending(&self, events: &mut AuthEvents) -> usize {
        let mut applied = 0;
        while let Some(Some(event)) = events.next().now_or_never() {
            applied += 1;
            if let Some(fetch) = self.dispatch(SessionAction::AuthChanged(event)) {
                self.load_profile(fetch).await;
            }
            self.revoke_after_reset().await;
        }
        applied
    }

    async fn load_profile(&self, request: ProfileRequest) {
        let result = self.backend.fetch_profile(&request.user_id).await;
        self.dispatch(SessionAction::ProfileLoaded {
            request: request.generation,
            result,
        });
        self.revoke_after_reset().await;
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// [`AuthFailure::Rejected`] for bad credentials or an unconfirmed
    /// account, [`AuthFailure::Unavailable`] when the service fails.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthFailure> {
        let email = validate_credentials(email, password)?;
        let request = self.begin_request();
        let session = self.backend.sign_in_with_password(&email, password).await?;
        if let Some(fetch) = self.dispatch(SessionAction::SignedIn {
            request,
            session: session.clone(),
        }) {
            self.load_profile(fetch).await;
        }
        self.revoke_after_reset().await;
        Ok(session)
    }

    /// Create an account. A pending confirmation leaves the store signed out.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`SessionStore::sign_in_with_password`].
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, AuthFailure> {
        let email = validate_credentials(email, password)?;
        let request = self.begin_request();
        let outcome = self
            .backend
            .sign_up(&email, password, self.redirect_to.as_deref())
            .await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            if let Some(fetch) = self.dispatch(SessionAction::SignedIn {
                request,
                session: session.clone(),
            }) {
                self.load_profile(fetch).await;
            }
        }
        self.revoke_after_reset().await;
        Ok(outcome)
    }

    /// Start the Google redirect flow. Success only means the redirect began;
    /// the session arrives through the auth notification channel.
    ///
    /// # Errors
    ///
    /// Returns the failure that prevented the redirect.
    pub async fn sign_in_with_google(&self) -> Result<(), AuthFailure> {
        self.backend
            .sign_in_with_oauth(OAuthProvider::Google, self.redirect_to.as_deref())
            .await
            .map_err(AuthFailure::from)
    }

    /// Clear session and profile at once, then revoke remotely. Safe to call
    /// when already signed out.
    pub async fn sign_out(&self) {
        let was_signed_in = self.snapshot().signed_in();
        self.dispatch(SessionAction::SignedOut);
        if !was_signed_in {
            return;
        }
        if let Err(err) = self.backend.sign_out().await {
            log::warn!("remote sign-out failed, local session already cleared: {err}");
        }
    }

    /// Persist the onboarding answers and mark the profile complete.
    ///
    /// # Errors
    ///
    /// [`AuthFailure::NotSignedIn`] without a session, a rejection for an
    /// invalid draft or taken username, or the backend failure.
    pub async fn complete_onboarding(
        &self,
        draft: ProfileDraft,
    ) -> Result<UserProfile, AuthFailure> {
        let user_id = self
            .snapshot()
            .session
            .map(|s| s.user_id().clone())
            .ok_or(AuthFailure::NotSignedIn)?;
        let profile = draft.into_profile(user_id)?;
        let saved = self.backend.save_profile(&profile).await?;
        self.dispatch(SessionAction::ProfileSaved(saved.clone()));
        self.revoke_after_reset().await;
        Ok(saved)
    }

    /// Fetch the current user's profile again.
    pub async fn reload_profile(&self) {
        if let Some(fetch) = self.dispatch(SessionAction::RefetchProfile) {
            self.load_profile(fetch).await;
        }
        self.revoke_after_reset().await;
    }

    pub fn set_theme(&self, theme: ThemeMode) {
        self.dispatch(SessionAction::ThemeChanged(theme));
    }

    /// Flip the theme and return the new mode.
    pub fn toggle_theme(&self) -> ThemeMode {
        let next = self.snapshot().theme.toggle();
        self.set_theme(next);
        next
    }

    pub fn dismiss_notice(&self) {
        self.dispatch(SessionAction::DismissNotice);
    }

    /// Public profile lookup for `/profile/:username`; works signed out.
    ///
    /// # Errors
    ///
    /// Returns the backend failure as an [`AuthFailure`].
    pub async fn public_profile(&self, username: &str) -> Result<Option<PublicProfile>, AuthFailure> {
        self.backend
            .fetch_public_profile(username)
            .await
            .map_err(AuthFailure::from)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<String, AuthFailure> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthFailure::Rejected(String::from(
            "Email and password are required",
        )));
    }
    if !email.contains('@') {
        return Err(AuthFailure::Rejected(String::from(
            "Enter a valid email address",
        )));
    }
    Ok(email.to_string())
}
