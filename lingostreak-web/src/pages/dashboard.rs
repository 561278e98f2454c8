use crate::components::nav_link::NavLink;
use crate::router::Route;
use lingostreak_core::{AppRoute, UserProfile};
use yew::prelude::*;

/// Sections surfaced as quick links on the dashboard.
const QUICK_LINKS: [AppRoute; 4] = [
    AppRoute::Tracker,
    AppRoute::Routines,
    AppRoute::Guides,
    AppRoute::Leaderboard,
];

#[derive(Properties, PartialEq, Clone)]
pub struct DashboardProps {
    pub profile: UserProfile,
}

#[function_component(Dashboard)]
pub fn dashboard(props: &DashboardProps) -> Html {
    let profile = &props.profile;
    let language = profile
        .target_language
        .clone()
        .unwrap_or_else(|| String::from("a new language"));
    html! {
        <section class="dashboard space-y-4" aria-labelledby="dashboard-title">
            <h1 id="dashboard-title" class="text-3xl font-bold">
                { format!("Hi, {}!", profile.display_label()) }
            </h1>
            <div class="stats shadow">
                <div class="stat">
                    <div class="stat-title">{ "Daily goal" }</div>
                    <div class="stat-value" id="daily-goal">{ format!("{} min", profile.daily_goal()) }</div>
                </div>
                <div class="stat">
                    <div class="stat-title">{ "Learning" }</div>
                    <div class="stat-value text-lg" id="target-language">{ language }</div>
                </div>
            </div>
            <ul class="quick-links flex gap-2">
                { for QUICK_LINKS.into_iter().map(|route| html! {
                    <li key={route.path()}>
                        <NavLink to={Route::from_app(route)} class={classes!("btn", "btn-outline")}>
                            { route.label() }
                        </NavLink>
                    </li>
                }) }
            </ul>
            <p class="text-sm opacity-70">
                { "Share your progress: " }
                <NavLink to={Route::PublicProfile { username: profile.username.clone() }}>
                    { format!("/profile/{}", profile.username) }
                </NavLink>
            </p>
        </section>
    }
}
