//! `/profile/:username`, reachable without signing in.
use lingostreak_core::gate::ScreenKind;
use lingostreak_core::{PublicProfile, SessionStore};
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Loading,
    Found(PublicProfile),
    Missing,
    Failed(String),
}

#[derive(Properties, PartialEq, Clone)]
pub struct PublicProfileCardProps {
    pub username: AttrValue,
    pub state: LookupState,
}

#[function_component(PublicProfileCard)]
pub fn public_profile_card(props: &PublicProfileCardProps) -> Html {
    let body = match &props.state {
        LookupState::Loading => html! {
            <span class="loading loading-dots" aria-busy="true">{ "Loading profile…" }</span>
        },
        LookupState::Missing => html! {
            <p id="public-profile-missing">{ format!("No learner called @{} yet.", props.username) }</p>
        },
        LookupState::Failed(message) => html! {
            <div class="alert alert-error" role="alert">{ message.clone() }</div>
        },
        LookupState::Found(profile) => {
            let name = profile
                .display_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| profile.username.clone());
            html! {
                <div class="public-profile-details">
                    if let Some(src) = profile.avatar_url.clone() {
                        <img class="avatar rounded-full w-16" {src} alt={format!("{name}'s avatar")} />
                    }
                    <h1 class="text-2xl font-bold" id="public-profile-name">{ name }</h1>
                    <p class="opacity-70">{ format!("@{}", profile.username) }</p>
                    if let Some(language) = profile.target_language.clone() {
                        <p class="badge badge-primary" id="public-profile-language">{ format!("Learning {language}") }</p>
                    }
                </div>
            }
        }
    };
    html! {
        <article class="card shadow-xl max-w-md w-full">
            <div class="card-body">{ body }</div>
        </article>
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct PublicProfilePageProps {
    pub store: SessionStore,
    pub username: AttrValue,
}

/// Looks the profile up whenever the username changes.
#[function_component(PublicProfilePage)]
pub fn public_profile_page(props: &PublicProfilePageProps) -> Html {
    let state = use_state(|| LookupState::Loading);
    {
        let state = state.clone();
        let store = props.store.clone();
        use_effect_with(props.username.clone(), move |username| {
            state.set(LookupState::Loading);
            let username = username.to_string();
            yew::platform::spawn_local(async move {
                let next = match store.public_profile(&username).await {
                    Ok(Some(profile)) => LookupState::Found(profile),
                    Ok(None) => LookupState::Missing,
                    Err(err) => LookupState::Failed(err.message()),
                };
                state.set(next);
            });
            || {}
        });
    }
    html! {
        <section class="public-profile-page min-h-screen flex items-center justify-center" data-screen={ScreenKind::PublicProfile.marker()}>
            <PublicProfileCard username={props.username.clone()} state={(*state).clone()} />
        </section>
    }
}
