use lingostreak_core::AppRoute;
use yew_router::prelude::*;

#[derive(Clone, Debug, Routable, PartialEq, Eq)]
pub enum Route {
    #[at("/")]
    Root,
    #[at("/dashboard")]
    Dashboard,
    #[at("/tracker")]
    Tracker,
    #[at("/routines")]
    Routines,
    #[at("/guides")]
    Guides,
    #[at("/settings")]
    Settings,
    #[at("/rewards")]
    Rewards,
    #[at("/leaderboard")]
    Leaderboard,
    #[at("/feed")]
    Feed,
    #[at("/profile")]
    Profile,
    #[at("/profile/:username")]
    PublicProfile { username: String },
    #[at("/404")]
    #[not_found]
    NotFound,
}

impl Route {
    #[must_use]
    pub const fn from_app(route: AppRoute) -> Self {
        match route {
            AppRoute::Dashboard => Self::Dashboard,
            AppRoute::Tracker => Self::Tracker,
            AppRoute::Routines => Self::Routines,
            AppRoute::Guides => Self::Guides,
            AppRoute::Settings => Self::Settings,
            AppRoute::Rewards => Self::Rewards,
            AppRoute::Leaderboard => Self::Leaderboard,
            AppRoute::Feed => Self::Feed,
            AppRoute::Profile => Self::Profile,
        }
    }

    #[must_use]
    pub const fn to_app(&self) -> Option<AppRoute> {
        match self {
            Self::Dashboard => Some(AppRoute::Dashboard),
            Self::Tracker => Some(AppRoute::Tracker),
            Self::Routines => Some(AppRoute::Routines),
            Self::Guides => Some(AppRoute::Guides),
            Self::Settings => Some(AppRoute::Settings),
            Self::Rewards => Some(AppRoute::Rewards),
            Self::Leaderboard => Some(AppRoute::Leaderboard),
            Self::Feed => Some(AppRoute::Feed),
            Self::Profile => Some(AppRoute::Profile),
            Self::Root | Self::PublicProfile { .. } | Self::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_routes_round_trip_and_share_paths() {
        for route in AppRoute::ALL {
            let mapped = Route::from_app(route);
            assert_eq!(mapped.to_app(), Some(route));
            assert_eq!(mapped.to_path(), route.path());
        }
        assert_eq!(Route::Root.to_app(), None);
    }

    #[test]
    fn public_profile_route_recognises_username() {
        assert_eq!(
            Route::recognize("/profile/alice"),
            Some(Route::PublicProfile {
                username: "alice".into()
            })
        );
        assert_eq!(Route::recognize("/profile"), Some(Route::Profile));
    }
}
