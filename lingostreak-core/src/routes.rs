//! Authenticated route table.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppRoute {
    Dashboard,
    Tracker,
    Routines,
    Guides,
    Settings,
    Rewards,
    Leaderboard,
    Feed,
    Profile,
}

impl AppRoute {
    pub const DEFAULT: Self = Self::Dashboard;

    pub const ALL: [Self; 9] = [
        Self::Dashboard,
        Self::Tracker,
        Self::Routines,
        Self::Guides,
        Self::Settings,
        Self::Rewards,
        Self::Leaderboard,
        Self::Feed,
        Self::Profile,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Tracker => "/tracker",
            Self::Routines => "/routines",
            Self::Guides => "/guides",
            Self::Settings => "/settings",
            Self::Rewards => "/rewards",
            Self::Leaderboard => "/leaderboard",
            Self::Feed => "/feed",
            Self::Profile => "/profile",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Tracker => "Tracker",
            Self::Routines => "Routines",
            Self::Guides => "Guides",
            Self::Settings => "Settings",
            Self::Rewards => "Rewards",
            Self::Leaderboard => "Leaderboard",
            Self::Feed => "Feed",
            Self::Profile => "Profile",
        }
    }

    /// Match a location path against the table. Query strings, fragments and a
    /// single trailing slash are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = normalize_path(path);
        Self::ALL.into_iter().find(|route| route.path() == path)
    }
}

/// Strip query, fragment and trailing slash (except for the root).
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for route in AppRoute::ALL {
            assert_eq!(AppRoute::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn from_path_tolerates_decorations() {
        assert_eq!(AppRoute::from_path("/feed/"), Some(AppRoute::Feed));
        assert_eq!(AppRoute::from_path("/tracker?day=3"), Some(AppRoute::Tracker));
        assert_eq!(AppRoute::from_path("/guides#verbs"), Some(AppRoute::Guides));
        assert_eq!(AppRoute::from_path("/"), None);
        assert_eq!(AppRoute::from_path("/profile/alice"), None);
        assert_eq!(AppRoute::from_path("/nope"), None);
        assert_eq!(normalize_path("/"), "/");
    }
}
