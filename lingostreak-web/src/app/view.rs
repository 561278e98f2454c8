//! Maps a gate decision onto the screen that mounts for it.
use crate::app::context::AppContext;
use crate::components::layout::AppLayout;
use crate::components::notice::Notice;
use crate::pages::auth::AuthPage;
use crate::pages::dashboard::Dashboard;
use crate::pages::loading::LoadingScreen;
use crate::pages::onboarding::OnboardingPage;
use crate::pages::public_profile::PublicProfilePage;
use crate::pages::sections::SectionPage;
use crate::pages::settings::SettingsPage;
use lingostreak_core::{AppRoute, MobileNav, Screen, SessionStore, UserProfile};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ScreenViewProps {
    pub screen: Screen,
    pub context: AppContext,
    pub nav: MobileNav,
    pub on_nav_change: Callback<MobileNav>,
}

fn sign_out_callback(store: &SessionStore) -> Callback<()> {
    let store = store.clone();
    Callback::from(move |()| {
        let store = store.clone();
        yew::platform::spawn_local(async move { store.sign_out().await });
    })
}

fn route_page(route: AppRoute, profile: &UserProfile, props: &ScreenViewProps) -> Html {
    let snapshot = &props.context.snapshot;
    match route {
        AppRoute::Dashboard => html! { <Dashboard profile={profile.clone()} /> },
        AppRoute::Settings => {
            let store = props.context.store.clone();
            html! {
                <SettingsPage
                    theme={snapshot.theme}
                    email={snapshot.session.as_ref().and_then(|s| s.email()).map(|e| AttrValue::from(e.to_string()))}
                    on_toggle_theme={Callback::from(move |()| { store.toggle_theme(); })}
                    on_sign_out={sign_out_callback(&props.context.store)}
                />
            }
        }
        other => html! { <SectionPage route={other} profile={profile.clone()} /> },
    }
}

#[function_component(ScreenView)]
pub fn screen_view(props: &ScreenViewProps) -> Html {
    let store = &props.context.store;
    let snapshot = &props.context.snapshot;
    match &props.screen {
        Screen::Loading => html! { <LoadingScreen /> },
        Screen::PublicProfile { username } => html! {
            <PublicProfilePage store={store.clone()} username={AttrValue::from(username.clone())} />
        },
        Screen::Auth => html! {
            <AuthPage store={store.clone()} notice={snapshot.notice.clone().map(AttrValue::from)} />
        },
        Screen::Onboarding => html! {
            <OnboardingPage
                store={store.clone()}
                email={snapshot.session.as_ref().and_then(|s| s.email()).map(|e| AttrValue::from(e.to_string()))}
                profile_pending={snapshot.profile_pending}
                notice={snapshot.notice.clone().map(AttrValue::from)}
            />
        },
        Screen::App(destination) => {
            // The gate only admits the app with a profile.
            let Some(profile) = snapshot.profile.as_ref() else {
                return html! { <LoadingScreen /> };
            };
            let toggle_nav = {
                let nav = props.nav.clone();
                let cb = props.on_nav_change.clone();
                Callback::from(move |()| cb.emit(nav.toggled()))
            };
            let close_nav = {
                let nav = props.nav.clone();
                let cb = props.on_nav_change.clone();
                Callback::from(move |()| cb.emit(nav.closed()))
            };
            let toggle_theme = {
                let store = store.clone();
                Callback::from(move |()| {
                    store.toggle_theme();
                })
            };
            let notice = snapshot.notice.clone().map(|message| {
                let store = store.clone();
                html! {
                    <Notice
                        message={message}
                        on_dismiss={Some(Callback::from(move |()| store.dismiss_notice()))}
                    />
                }
            });
            html! {
                <AppLayout
                    current={destination.route}
                    user_label={AttrValue::from(profile.display_label().to_string())}
                    theme={snapshot.theme}
                    nav={props.nav.clone()}
                    on_toggle_nav={toggle_nav}
                    on_close_nav={close_nav}
                    on_toggle_theme={toggle_theme}
                    on_sign_out={sign_out_callback(store)}
                >
                    { for notice }
                    { route_page(destination.route, profile, props) }
                </AppLayout>
            }
        }
    }
}
