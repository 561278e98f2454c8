use futures::executor::block_on;
use lingostreak_core::{
    AppRoute, InMemoryBackend, PublicProfile, SessionStore, ThemeMode, UserId, UserProfile,
};
use lingostreak_web::pages::auth::{AuthMode, AuthPage, AuthPageProps};
use lingostreak_web::pages::dashboard::{Dashboard, DashboardProps};
use lingostreak_web::pages::loading::LoadingScreen;
use lingostreak_web::pages::onboarding::{OnboardingPage, OnboardingPageProps};
use lingostreak_web::pages::public_profile::{LookupState, PublicProfileCard, PublicProfileCardProps};
use lingostreak_web::pages::sections::{SectionPage, SectionPageProps};
use lingostreak_web::pages::settings::{SettingsPage, SettingsPageProps};
use std::rc::Rc;
use yew::{AttrValue, Callback, LocalServerRenderer};

fn store() -> SessionStore {
    SessionStore::new(Rc::new(InMemoryBackend::demo()), ThemeMode::Light)
}

fn profile() -> UserProfile {
    UserProfile {
        id: UserId::new("u1"),
        username: "alice".into(),
        display_name: Some("Alice".into()),
        target_language: Some("es".into()),
        native_language: Some("en".into()),
        daily_goal_minutes: Some(20),
        onboarding_complete: true,
        avatar_url: None,
    }
}

#[test]
fn loading_screen_carries_marker() {
    let html = block_on(LocalServerRenderer::<LoadingScreen>::new().render());
    assert!(html.contains(r#"data-screen="loading""#));
    assert!(html.contains("aria-busy"));
}

#[test]
fn auth_page_renders_both_modes() {
    let props = AuthPageProps {
        store: store(),
        initial_mode: AuthMode::SignIn,
        notice: None,
    };
    let html = block_on(LocalServerRenderer::<AuthPage>::with_props(props).render());
    assert!(html.contains(r#"data-screen="auth""#));
    assert!(html.contains("auth-email"));
    assert!(html.contains("Continue with Google"));
    assert!(html.contains("Welcome back"));

    let props = AuthPageProps {
        store: store(),
        initial_mode: AuthMode::SignUp,
        notice: None,
    };
    let html = block_on(LocalServerRenderer::<AuthPage>::with_props(props).render());
    assert!(html.contains("Create your account"));
    assert!(html.contains("new-password"));
    assert!(!html.contains("auth-notice"));
}

#[test]
fn auth_page_shows_store_notice() {
    let props = AuthPageProps {
        store: store(),
        initial_mode: AuthMode::SignIn,
        notice: Some(AttrValue::from("Access denied by Google")),
    };
    let html = block_on(LocalServerRenderer::<AuthPage>::with_props(props).render());
    assert!(html.contains(r#"id="auth-notice""#));
    assert!(html.contains("alert-error"));
    assert!(html.contains("Access denied by Google"));
}

#[test]
fn onboarding_shows_pending_and_notice() {
    let props = OnboardingPageProps {
        store: store(),
        email: Some(AttrValue::from("user@example.com")),
        profile_pending: true,
        notice: Some(AttrValue::from("We couldn't load your profile")),
    };
    let html = block_on(LocalServerRenderer::<OnboardingPage>::with_props(props).render());
    assert!(html.contains(r#"data-screen="onboarding""#));
    assert!(html.contains("profile-checking"));
    assert!(html.contains("Signed in as user@example.com"));
    assert!(html.contains("Try again"));
    assert!(html.contains("onboarding-username"));

    let quiet = OnboardingPageProps {
        store: store(),
        email: None,
        profile_pending: false,
        notice: None,
    };
    let html = block_on(LocalServerRenderer::<OnboardingPage>::with_props(quiet).render());
    assert!(!html.contains("profile-checking"));
    assert!(!html.contains("Try again"));
}

#[test]
fn public_profile_card_states() {
    let render = |state| {
        block_on(
            LocalServerRenderer::<PublicProfileCard>::with_props(PublicProfileCardProps {
                username: AttrValue::from("alice"),
                state,
            })
            .render(),
        )
    };
    let found = render(LookupState::Found(PublicProfile {
        username: "alice".into(),
        display_name: Some("Alice".into()),
        target_language: Some("es".into()),
        avatar_url: None,
    }));
    assert!(found.contains("public-profile-name"));
    assert!(found.contains("Learning es"));

    assert!(render(LookupState::Missing).contains("No learner called @alice"));
    assert!(render(LookupState::Failed("Failed to fetch".into())).contains("Failed to fetch"));
    assert!(render(LookupState::Loading).contains("Loading profile"));
}

#[test]
fn dashboard_greets_and_links_public_page() {
    let html = block_on(
        LocalServerRenderer::<Dashboard>::with_props(DashboardProps { profile: profile() }).render(),
    );
    assert!(html.contains("Hi, Alice!"));
    assert!(html.contains("20 min"));
    assert!(html.contains(r#"href="/profile/alice""#));
    assert!(html.contains(r#"href="/tracker""#));
}

#[test]
fn settings_reflects_theme() {
    let props = SettingsPageProps {
        theme: ThemeMode::Dark,
        email: Some(AttrValue::from("alice@example.com")),
        on_toggle_theme: Callback::noop(),
        on_sign_out: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<SettingsPage>::with_props(props).render());
    assert!(html.contains("settings-dark-mode"));
    assert!(html.contains("checked"));
    assert!(html.contains("Account: alice@example.com"));
}

#[test]
fn section_pages_label_every_remaining_route() {
    for route in AppRoute::ALL {
        if matches!(route, AppRoute::Dashboard | AppRoute::Settings) {
            continue;
        }
        let html = block_on(
            LocalServerRenderer::<SectionPage>::with_props(SectionPageProps {
                route,
                profile: profile(),
            })
            .render(),
        );
        assert!(html.contains(route.label()), "{route:?}");
        assert!(html.contains(route.path()));
    }
}
