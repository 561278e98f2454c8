//! Pure state transitions for the session store.
//!
//! Every mutation of session, profile, load latch and theme goes through
//! [`SessionState::apply`]. Async work lives in [`super::SessionStore`]; this
//! module only decides what a finished request is allowed to change.
use crate::backend::{AuthEvent, AuthEventKind};
use crate::error::{AuthFailure, BackendError, IntegrityViolation};
use crate::profile::UserProfile;
use crate::session::{Session, UserId};
use crate::theme::ThemeMode;

/// Monotonic tag attached to in-flight requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A profile fetch the store must start on behalf of a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub generation: Generation,
    pub user_id: UserId,
}

/// Read-only view handed to the gate and the screens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,
    pub initial_load_complete: bool,
    pub theme: ThemeMode,
    /// A profile fetch for the current session has not answered yet.
    pub profile_pending: bool,
    /// Message for the user after a degraded background operation.
    pub notice: Option<String>,
}

impl SessionSnapshot {
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub const fn onboarded(&self) -> bool {
        self.profile.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// The persisted-session lookup started under `request` finished.
    Restored {
        request: Generation,
        result: Result<Option<Session>, BackendError>,
    },
    /// Notification from the backend subscription.
    AuthChanged(AuthEvent),
    /// A password sign-in or sign-up started under `request` produced a session.
    SignedIn {
        request: Generation,
        session: Session,
    },
    SignedOut,
    ProfileLoaded {
        request: Generation,
        result: Result<Option<UserProfile>, BackendError>,
    },
    /// Onboarding stored a profile for `profile.id`.
    ProfileSaved(UserProfile),
    /// Fetch the current user's profile again, keeping the one on screen.
    RefetchProfile,
    ThemeChanged(ThemeMode),
    DismissNotice,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    snapshot: SessionSnapshot,
    generation: Generation,
    /// Generation of the profile fetch currently allowed to land.
    profile_request: Option<Generation>,
    last_violation: Option<IntegrityViolation>,
}

impl SessionState {
    #[must_use]
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            snapshot: SessionSnapshot {
                theme,
                ..SessionSnapshot::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Tag a new request; anything tagged earlier becomes stale.
    pub fn begin_request(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    #[must_use]
    pub fn is_current(&self, request: Generation) -> bool {
        self.generation == request
    }

    /// Integrity breach repaired during the most recent [`SessionState::apply`].
    #[must_use]
    pub const fn last_violation(&self) -> Option<&IntegrityViolation> {
        self.last_violation.as_ref()
    }

    /// Apply `action`; returns a profile fetch to start when a new identity
    /// signed in.
    pub fn apply(&mut self, action: SessionAction) -> Option<ProfileRequest> {
        self.last_violation = None;
        let request = match action {
            SessionAction::Restored { request, result } => self.on_restored(request, result),
            SessionAction::AuthChanged(event) => self.on_auth_event(event),
            SessionAction::SignedIn { request, session } => {
                if self.is_current(request) {
                    self.replace_session(Some(session))
                } else {
                    log::debug!("discarding stale sign-in result (request {})", request.0);
                    None
                }
            }
            SessionAction::SignedOut => {
                self.clear_session();
                None
            }
            SessionAction::ProfileLoaded { request, result } => {
                self.on_profile_loaded(request, result);
                None
            }
            SessionAction::ProfileSaved(profile) => {
                self.on_profile_saved(profile);
                None
            }
            SessionAction::RefetchProfile => self.rearm_profile_request(),
            SessionAction::ThemeChanged(theme) => {
                self.snapshot.theme = theme;
                None
            }
            SessionAction::DismissNotice => {
                self.snapshot.notice = None;
                None
            }
        };
        if self.enforce_integrity() {
            return None;
        }
        request
    }

    fn on_restored(
        &mut self,
        request: Generation,
        result: Result<Option<Session>, BackendError>,
    ) -> Option<ProfileRequest> {
        self.mark_loaded();
        if !self.is_current(request) {
            log::debug!("discarding stale restore result (request {})", request.0);
            return None;
        }
        match result {
            Ok(restored) => self.replace_session(restored),
            Err(err) => {
                // Failed OAuth callback exchanges land here too.
                log::warn!("could not restore saved session: {err}");
                self.snapshot.notice = Some(AuthFailure::from(err).message());
                None
            }
        }
    }

    fn on_auth_event(&mut self, event: AuthEvent) -> Option<ProfileRequest> {
        self.mark_loaded();
        log::debug!("auth event {:?}", event.kind);
        if event.kind == AuthEventKind::SignedOut {
            self.clear_session();
            return None;
        }
        let session = event.effective_session().cloned();
        if session.is_none() && event.kind != AuthEventKind::InitialSession {
            // A refresh or user update without a session means the backend lost it.
            self.clear_session();
            return None;
        }
        self.replace_session(session)
    }

    fn on_profile_loaded(
        &mut self,
        request: Generation,
        result: Result<Option<UserProfile>, BackendError>,
    ) {
        if self.profile_request != Some(request) {
            log::debug!("discarding stale profile response (request {})", request.0);
            return;
        }
        self.profile_request = None;
        self.snapshot.profile_pending = false;
        let Some(user_id) = self.snapshot.session.as_ref().map(|s| s.user_id().clone()) else {
            return;
        };
        match result {
            Ok(Some(profile)) if profile.id == user_id && profile.is_onboarded() => {
                self.snapshot.profile = Some(profile);
            }
            Ok(Some(profile)) if profile.id != user_id => {
                log::warn!("profile for {} returned to session of {user_id}", profile.id);
                self.snapshot.profile = None;
            }
            Ok(_) => {
                self.snapshot.profile = None;
            }
            Err(err) => {
                log::warn!("profile fetch failed, continuing without profile: {err}");
                self.snapshot.profile = None;
                self.snapshot.notice = Some(format!("We couldn't load your profile: {err}"));
            }
        }
    }

    fn on_profile_saved(&mut self, profile: UserProfile) {
        let owns_session = self
            .snapshot
            .session
            .as_ref()
            .is_some_and(|s| s.user_id() == &profile.id);
        if !owns_session {
            log::debug!("ignoring saved profile for {} without its session", profile.id);
            return;
        }
        if !profile.is_onboarded() {
            return;
        }
        // A fresh save supersedes any fetch still in flight.
        self.profile_request = None;
        self.snapshot.profile_pending = false;
        self.snapshot.profile = Some(profile);
        self.snapshot.notice = None;
    }

    fn rearm_profile_request(&mut self) -> Option<ProfileRequest> {
        let user_id = self.snapshot.session.as_ref()?.user_id().clone();
        let generation = self.begin_request();
        self.profile_request = Some(generation);
        self.snapshot.profile_pending = true;
        Some(ProfileRequest {
            generation,
            user_id,
        })
    }

    fn mark_loaded(&mut self) {
        if !self.snapshot.initial_load_complete {
            log::debug!("initial session resolution finished");
            self.snapshot.initial_load_complete = true;
        }
    }

    fn replace_session(&mut self, session: Option<Session>) -> Option<ProfileRequest> {
        let Some(session) = session else {
            self.clear_session();
            return None;
        };
        if let Some(current) = self.snapshot.session.as_mut() {
            if current.same_user(&session) {
                *current = session;
                return None;
            }
        }
        let user_id = session.user_id().clone();
        let generation = self.begin_request();
        self.snapshot.session = Some(session);
        self.snapshot.profile = None;
        self.snapshot.profile_pending = true;
        self.snapshot.notice = None;
        self.profile_request = Some(generation);
        Some(ProfileRequest {
            generation,
            user_id,
        })
    }

    fn clear_session(&mut self) {
        if self.snapshot.session.is_some() || self.snapshot.profile.is_some() {
            log::debug!("clearing session and profile");
        }
        self.generation = self.generation.next();
        self.snapshot.session = None;
        self.snapshot.profile = None;
        self.snapshot.profile_pending = false;
        self.profile_request = None;
    }

    /// Repair a profile that outlived its session. Returns true when a reset
    /// happened.
    fn enforce_integrity(&mut self) -> bool {
        if self.snapshot.session.is_some() {
            return false;
        }
        let Some(profile) = self.snapshot.profile.take() else {
            return false;
        };
        let violation = IntegrityViolation {
            user: profile.id.to_string(),
        };
        log::error!("{violation}");
        self.clear_session();
        self.snapshot.notice = None;
        self.last_violation = Some(violation);
        true
    }

    /// Drop the session but keep the profile, a state no action produces.
    #[cfg(test)]
    pub(crate) fn orphan_profile(&mut self) {
        self.snapshot.session = None;
    }
}
