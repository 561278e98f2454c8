//! Properties every sequence of store notifications must satisfy.
//!
//! Shared by the integration tests and the QA tester so both hold the store
//! to the same rules.
use crate::gate::{GateInput, ScreenKind, public_profile_username, resolve};
use crate::store::{SessionSnapshot, SessionStore};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Paths the gate is checked against after every notification.
pub const CHECKED_PATHS: [&str; 6] = [
    "/",
    "/dashboard",
    "/settings",
    "/profile",
    "/profile/alice",
    "/no-such-page",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("notification {index}: profile visible without a session")]
    ProfileWithoutSession { index: usize },
    #[error("notification {index}: initial load latch went back to false")]
    LoadLatchReset { index: usize },
    #[error("notification {index}: gate chose {actual:?} for {path}, expected {expected:?}")]
    GateMismatch {
        index: usize,
        path: &'static str,
        expected: ScreenKind,
        actual: ScreenKind,
    },
}

/// Gate priority restated from the snapshot fields alone.
#[must_use]
pub fn expected_screen(snapshot: &SessionSnapshot, path: &str) -> ScreenKind {
    if !snapshot.initial_load_complete {
        ScreenKind::Loading
    } else if public_profile_username(path).is_some() {
        ScreenKind::PublicProfile
    } else if snapshot.session.is_none() {
        ScreenKind::Auth
    } else if snapshot.profile.is_none() {
        ScreenKind::Onboarding
    } else {
        ScreenKind::App
    }
}

/// Screen the gate picks for the store's current snapshot.
#[must_use]
pub fn screen_at(store: &SessionStore, path: &str) -> ScreenKind {
    resolve(GateInput::from_snapshot(&store.snapshot(), path)).kind()
}

/// Check a recorded notification sequence.
///
/// # Errors
///
/// Returns the first violation found, in notification order.
pub fn check_snapshots(seen: &[SessionSnapshot]) -> Result<(), InvariantViolation> {
    let mut loaded = false;
    for (index, snapshot) in seen.iter().enumerate() {
        if snapshot.profile.is_some() && snapshot.session.is_none() {
            return Err(InvariantViolation::ProfileWithoutSession { index });
        }
        if loaded && !snapshot.initial_load_complete {
            return Err(InvariantViolation::LoadLatchReset { index });
        }
        loaded = snapshot.initial_load_complete;
        for path in CHECKED_PATHS {
            let expected = expected_screen(snapshot, path);
            let actual = resolve(GateInput::from_snapshot(snapshot, path)).kind();
            if expected != actual {
                return Err(InvariantViolation::GateMismatch {
                    index,
                    path,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}

/// Listener that keeps every snapshot the store publishes.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecorder {
    seen: Rc<RefCell<Vec<SessionSnapshot>>>,
}

impl SnapshotRecorder {
    pub fn attach(store: &SessionStore) -> Self {
        let recorder = Self::default();
        let sink = recorder.seen.clone();
        store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.clone()));
        recorder
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        self.seen.borrow().clone()
    }

    /// # Errors
    ///
    /// Returns the first violation among the recorded snapshots.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        check_snapshots(&self.seen.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Session, UserId, UserProfile};

    fn session() -> Session {
        Session::bearer("token", UserId::new("u1"), None)
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            username: "alice".into(),
            display_name: None,
            target_language: Some("es".into()),
            native_language: None,
            daily_goal_minutes: None,
            onboarding_complete: true,
            avatar_url: None,
        }
    }

    #[test]
    fn well_formed_sequence_passes() {
        let loading = SessionSnapshot::default();
        let signed_out = SessionSnapshot {
            initial_load_complete: true,
            ..SessionSnapshot::default()
        };
        let onboarded = SessionSnapshot {
            session: Some(session()),
            profile: Some(profile()),
            ..signed_out.clone()
        };
        assert_eq!(check_snapshots(&[loading, signed_out, onboarded]), Ok(()));
    }

    #[test]
    fn orphan_profile_is_reported() {
        let orphan = SessionSnapshot {
            profile: Some(profile()),
            initial_load_complete: true,
            ..SessionSnapshot::default()
        };
        assert_eq!(
            check_snapshots(&[orphan]),
            Err(InvariantViolation::ProfileWithoutSession { index: 0 })
        );
    }

    #[test]
    fn latch_reset_is_reported() {
        let loaded = SessionSnapshot {
            initial_load_complete: true,
            ..SessionSnapshot::default()
        };
        assert_eq!(
            check_snapshots(&[loaded, SessionSnapshot::default()]),
            Err(InvariantViolation::LoadLatchReset { index: 1 })
        );
    }

    #[test]
    fn expected_screen_follows_priority() {
        let loading = SessionSnapshot::default();
        assert_eq!(expected_screen(&loading, "/profile/alice"), ScreenKind::Loading);
        let signed_in = SessionSnapshot {
            session: Some(session()),
            initial_load_complete: true,
            ..SessionSnapshot::default()
        };
        assert_eq!(expected_screen(&signed_in, "/dashboard"), ScreenKind::Onboarding);
        assert_eq!(
            expected_screen(&signed_in, "/profile/alice"),
            ScreenKind::PublicProfile
        );
    }
}
