//! Profile setup for signed-in users without a completed profile.
use crate::components::notice::Notice;
use lingostreak_core::gate::ScreenKind;
use lingostreak_core::profile::{DEFAULT_DAILY_GOAL_MINUTES, MAX_DAILY_GOAL_MINUTES, MIN_DAILY_GOAL_MINUTES};
use lingostreak_core::{ProfileDraft, SessionStore};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::platform::spawn_local;
use yew::prelude::*;

/// Languages offered in the onboarding form: (code, label).
pub const LANGUAGES: [(&str, &str); 10] = [
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("en", "English"),
];

/// Parse the goal field; anything unreadable keeps the previous value.
#[must_use]
pub fn parse_goal(raw: &str, previous: u32) -> u32 {
    raw.trim().parse().unwrap_or(previous)
}

#[derive(Properties, PartialEq, Clone)]
pub struct OnboardingPageProps {
    pub store: SessionStore,
    #[prop_or_default]
    pub email: Option<AttrValue>,
    /// The profile lookup for this session has not answered yet.
    #[prop_or_default]
    pub profile_pending: bool,
    #[prop_or_default]
    pub notice: Option<AttrValue>,
}

fn language_options(selected: &str) -> Html {
    html! {
        <>
            <option value="" selected={selected.is_empty()}>{ "Choose…" }</option>
            { for LANGUAGES.iter().map(|(code, label)| html! {
                <option value={*code} selected={*code == selected}>{ *label }</option>
            }) }
        </>
    }
}

#[function_component(OnboardingPage)]
pub fn onboarding_page(props: &OnboardingPageProps) -> Html {
    let draft = use_state(|| ProfileDraft {
        daily_goal_minutes: DEFAULT_DAILY_GOAL_MINUTES,
        ..ProfileDraft::default()
    });
    let error = use_state(|| None::<String>);
    let busy = use_state(|| false);

    let on_text = |apply: fn(&mut ProfileDraft, String)| {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*draft).clone();
            apply(&mut next, e.target_unchecked_into::<HtmlInputElement>().value());
            draft.set(next);
        })
    };
    let on_select = |apply: fn(&mut ProfileDraft, String)| {
        let draft = draft.clone();
        Callback::from(move |e: Event| {
            let mut next = (*draft).clone();
            apply(&mut next, e.target_unchecked_into::<HtmlSelectElement>().value());
            draft.set(next);
        })
    };
    let on_username = on_text(|d, v| d.username = v);
    let on_display_name = on_text(|d, v| d.display_name = v);
    let on_goal = on_text(|d, v| d.daily_goal_minutes = parse_goal(&v, d.daily_goal_minutes));
    let on_target = on_select(|d, v| d.target_language = v);
    let on_native = on_select(|d, v| d.native_language = v);

    let on_submit = {
        let store = props.store.clone();
        let (draft, error, busy) = (draft.clone(), error.clone(), busy.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *busy {
                return;
            }
            if let Err(err) = draft.validate() {
                error.set(Some(err.to_string()));
                return;
            }
            busy.set(true);
            error.set(None);
            let store = store.clone();
            let submitted = (*draft).clone();
            let (error, busy) = (error.clone(), busy.clone());
            spawn_local(async move {
                if let Err(err) = store.complete_onboarding(submitted).await {
                    error.set(Some(err.message()));
                }
                busy.set(false);
            });
        })
    };

    let on_retry = {
        let store = props.store.clone();
        Callback::from(move |()| {
            let store = store.clone();
            spawn_local(async move { store.reload_profile().await });
        })
    };
    let on_dismiss = {
        let store = props.store.clone();
        Callback::from(move |()| store.dismiss_notice())
    };
    let on_sign_out = {
        let store = props.store.clone();
        Callback::from(move |_| {
            let store = store.clone();
            spawn_local(async move { store.sign_out().await });
        })
    };

    html! {
        <section class="onboarding-page min-h-screen flex items-center justify-center" data-screen={ScreenKind::Onboarding.marker()}>
            <div class="card w-full max-w-md shadow-xl">
                <form class="card-body" onsubmit={on_submit}>
                    <h1 class="card-title">{ "Set up your profile" }</h1>
                    if let Some(email) = props.email.clone() {
                        <p class="text-sm opacity-70">{ format!("Signed in as {email}") }</p>
                    }
                    if props.profile_pending {
                        <p class="text-sm" id="profile-checking" aria-live="polite">{ "Checking for an existing profile…" }</p>
                    }
                    if let Some(message) = props.notice.clone() {
                        <Notice {message} on_retry={Some(on_retry)} on_dismiss={Some(on_dismiss)} />
                    }
                    if let Some(message) = (*error).clone() {
                        <div class="alert alert-error" role="alert" id="onboarding-error">{ message }</div>
                    }
                    <label class="form-control">
                        <span class="label-text">{ "Username" }</span>
                        <input id="onboarding-username" class="input input-bordered" autocomplete="username"
                            value={draft.username.clone()} oninput={on_username} />
                    </label>
                    <label class="form-control">
                        <span class="label-text">{ "Display name (optional)" }</span>
                        <input id="onboarding-display-name" class="input input-bordered"
                            value={draft.display_name.clone()} oninput={on_display_name} />
                    </label>
                    <label class="form-control">
                        <span class="label-text">{ "I'm learning" }</span>
                        <select id="onboarding-target" class="select select-bordered" onchange={on_target}>
                            { language_options(&draft.target_language) }
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">{ "I speak" }</span>
                        <select id="onboarding-native" class="select select-bordered" onchange={on_native}>
                            { language_options(&draft.native_language) }
                        </select>
                    </label>
                    <label class="form-control">
                        <span class="label-text">{ "Daily goal (minutes)" }</span>
                        <input id="onboarding-goal" type="number" class="input input-bordered"
                            min={MIN_DAILY_GOAL_MINUTES.to_string()} max={MAX_DAILY_GOAL_MINUTES.to_string()}
                            value={draft.daily_goal_minutes.to_string()} oninput={on_goal} />
                    </label>
                    <button id="onboarding-submit" type="submit" class="btn btn-primary" disabled={*busy}>
                        { "Start learning" }
                    </button>
                    <button id="onboarding-sign-out" type="button" class="btn btn-link" onclick={on_sign_out}>
                        { "Sign out" }
                    </button>
                </form>
            </div>
        </section>
    }
}
