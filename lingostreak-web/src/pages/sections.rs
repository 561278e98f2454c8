//! Pages for the remaining authenticated views.
use crate::components::nav_link::NavLink;
use crate::router::Route;
use lingostreak_core::{AppRoute, UserProfile};
use yew::prelude::*;

/// One-line description per section.
#[must_use]
pub const fn blurb(route: AppRoute) -> &'static str {
    match route {
        AppRoute::Dashboard => "Your day at a glance.",
        AppRoute::Tracker => "Log today's practice and keep your streak alive.",
        AppRoute::Routines => "Plan recurring study sessions.",
        AppRoute::Guides => "Grammar notes and study tips.",
        AppRoute::Settings => "Account and display preferences.",
        AppRoute::Rewards => "Badges earned along the way.",
        AppRoute::Leaderboard => "See how your streak compares.",
        AppRoute::Feed => "Updates from learners you follow.",
        AppRoute::Profile => "How other learners see you.",
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct SectionPageProps {
    pub route: AppRoute,
    pub profile: UserProfile,
}

#[function_component(SectionPage)]
pub fn section_page(props: &SectionPageProps) -> Html {
    let route = props.route;
    let extra = (route == AppRoute::Profile).then(|| {
        let username = props.profile.username.clone();
        html! {
            <p>
                <NavLink to={Route::PublicProfile { username: username.clone() }}>
                    { format!("View public page for @{username}") }
                </NavLink>
            </p>
        }
    });
    html! {
        <section class="section-page space-y-2" data-section={route.path()} aria-labelledby="section-title">
            <h1 id="section-title" class="text-3xl font-bold">{ route.label() }</h1>
            <p class="opacity-70">{ blurb(route) }</p>
            { for extra }
        </section>
    }
}
