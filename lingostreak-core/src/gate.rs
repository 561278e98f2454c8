//! Route gate: decides which top-level screen mounts.
//!
//! Priority, highest first: loading, public profile, sign-in, onboarding,
//! authenticated app. Only the public-profile check looks at the path before
//! authentication is considered.
use crate::routes::{AppRoute, normalize_path};
use crate::store::SessionSnapshot;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PUBLIC_PROFILE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^/profile/([^/]+)$").ok());

/// Username in a `/profile/:username` path.
#[must_use]
pub fn public_profile_username(path: &str) -> Option<&str> {
    let path = normalize_path(path);
    PUBLIC_PROFILE_RE
        .as_ref()?
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Document theme is left alone on public profile pages.
#[must_use]
pub fn theme_applies(path: &str) -> bool {
    public_profile_username(path).is_none()
}

/// Authenticated destination after resolving the requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination {
    pub route: AppRoute,
    /// The requested path was unknown and the default route was chosen.
    pub redirected: bool,
}

impl Destination {
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        AppRoute::from_path(path).map_or(
            Self {
                route: AppRoute::DEFAULT,
                redirected: true,
            },
            |route| Self {
                route,
                redirected: false,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Screen {
    Loading,
    PublicProfile { username: String },
    Auth,
    Onboarding,
    App(Destination),
}

/// Discriminant of [`Screen`], used for DOM markers and scenario traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenKind {
    Loading,
    PublicProfile,
    Auth,
    Onboarding,
    App,
}

impl ScreenKind {
    /// Value of the `data-screen` attribute on the mounted screen.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::PublicProfile => "public-profile",
            Self::Auth => "auth",
            Self::Onboarding => "onboarding",
            Self::App => "app",
        }
    }
}

impl Screen {
    #[must_use]
    pub const fn kind(&self) -> ScreenKind {
        match self {
            Self::Loading => ScreenKind::Loading,
            Self::PublicProfile { .. } => ScreenKind::PublicProfile,
            Self::Auth => ScreenKind::Auth,
            Self::Onboarding => ScreenKind::Onboarding,
            Self::App(_) => ScreenKind::App,
        }
    }
}

/// Everything the gate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInput<'a> {
    pub session_present: bool,
    pub profile_present: bool,
    pub initial_load_complete: bool,
    pub path: &'a str,
}

impl<'a> GateInput<'a> {
    #[must_use]
    pub const fn from_snapshot(snapshot: &SessionSnapshot, path: &'a str) -> Self {
        Self {
            session_present: snapshot.session.is_some(),
            profile_present: snapshot.profile.is_some(),
            initial_load_complete: snapshot.initial_load_complete,
            path,
        }
    }
}

#[must_use]
pub fn resolve(input: GateInput<'_>) -> Screen {
    if !input.initial_load_complete {
        return Screen::Loading;
    }
    if let Some(username) = public_profile_username(input.path) {
        return Screen::PublicProfile {
            username: username.to_string(),
        };
    }
    match (input.session_present, input.profile_present) {
        // A profile without a session is never trusted.
        (false, _) => Screen::Auth,
        (true, false) => Screen::Onboarding,
        (true, true) => Screen::App(Destination::for_path(input.path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(session: bool, profile: bool, loaded: bool, path: &str) -> GateInput<'_> {
        GateInput {
            session_present: session,
            profile_present: profile,
            initial_load_complete: loaded,
            path,
        }
    }

    #[test]
    fn public_profile_pattern() {
        assert_eq!(public_profile_username("/profile/alice"), Some("alice"));
        assert_eq!(public_profile_username("/profile/alice/"), Some("alice"));
        assert_eq!(public_profile_username("/profile/alice?tab=feed"), Some("alice"));
        assert_eq!(public_profile_username("/profile"), None);
        assert_eq!(public_profile_username("/profile/"), None);
        assert_eq!(public_profile_username("/profile/alice/posts"), None);
        assert!(!theme_applies("/profile/bob"));
        assert!(theme_applies("/profile"));
    }

    #[test]
    fn loading_outranks_public_profile() {
        assert_eq!(resolve(input(false, false, false, "/profile/alice")), Screen::Loading);
    }

    #[test]
    fn authenticated_paths_resolve_or_redirect() {
        assert_eq!(
            resolve(input(true, true, true, "/feed")),
            Screen::App(Destination {
                route: AppRoute::Feed,
                redirected: false,
            })
        );
        assert_eq!(
            resolve(input(true, true, true, "/missing")),
            Screen::App(Destination {
                route: AppRoute::Dashboard,
                redirected: true,
            })
        );
        assert_eq!(
            resolve(input(true, true, true, "/profile/alice")).kind(),
            ScreenKind::PublicProfile
        );
    }
}
