use futures::executor::block_on;
use lingostreak_core::memory::{DEMO_EMAIL, DEMO_PASSWORD, DEMO_PUBLIC_EMAIL};
use lingostreak_core::{
    BackendError, BackendErrorKind, InMemoryBackend, MobileNav, Screen, SessionStore, ThemeMode,
};
use lingostreak_web::app::context::AppContext;
use lingostreak_web::app::routing::screen_for;
use lingostreak_web::app::view::{ScreenView, ScreenViewProps};
use lingostreak_web::app::{AppProvider, AppShell};
use std::rc::Rc;
use yew::prelude::*;
use yew::{Callback, LocalServerRenderer};
use yew_router::history::{AnyHistory, History, MemoryHistory};
use yew_router::Router;

fn store_over(backend: InMemoryBackend) -> SessionStore {
    SessionStore::new(Rc::new(backend), ThemeMode::Light)
}

fn render_screen(store: &SessionStore, path: &str, nav: MobileNav) -> String {
    let snapshot = Rc::new(store.snapshot());
    let props = ScreenViewProps {
        screen: screen_for(&snapshot, path),
        context: AppContext {
            store: store.clone(),
            snapshot,
        },
        nav,
        on_nav_change: Callback::noop(),
    };
    block_on(LocalServerRenderer::<ScreenView>::with_props(props).render())
}

#[derive(Properties, PartialEq)]
struct ShellHarnessProps {
    store: SessionStore,
    path: AttrValue,
}

#[function_component(ShellHarness)]
fn shell_harness(props: &ShellHarnessProps) -> Html {
    let history = AnyHistory::from(MemoryHistory::new());
    history.push(props.path.to_string());
    html! {
        <Router {history}>
            <AppProvider store={props.store.clone()}>
                <AppShell />
            </AppProvider>
        </Router>
    }
}

fn render_shell(store: &SessionStore, path: &str) -> String {
    block_on(
        LocalServerRenderer::<ShellHarness>::with_props(ShellHarnessProps {
            store: store.clone(),
            path: AttrValue::from(path.to_string()),
        })
        .render(),
    )
}

#[test]
fn unresolved_store_renders_loading_even_for_public_profiles() {
    let store = store_over(InMemoryBackend::demo());
    assert!(render_shell(&store, "/profile/alice").contains(r#"data-screen="loading""#));
    assert!(render_shell(&store, "/dashboard").contains(r#"data-screen="loading""#));
}

#[test]
fn signed_out_visitors_see_auth_or_public_profile() {
    let store = store_over(InMemoryBackend::demo());
    block_on(store.bootstrap());
    assert!(render_shell(&store, "/dashboard").contains(r#"data-screen="auth""#));
    assert!(render_shell(&store, "/profile/alice").contains(r#"data-screen="public-profile""#));
}

#[test]
fn signed_in_without_profile_lands_on_onboarding() {
    let store = store_over(InMemoryBackend::demo());
    block_on(async {
        store.bootstrap().await;
        store.sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    });
    let html = render_shell(&store, "/feed");
    assert!(html.contains(r#"data-screen="onboarding""#));
    assert!(html.contains("Signed in as user@example.com"));
}

#[test]
fn onboarded_users_get_the_requested_view() {
    let store = store_over(InMemoryBackend::demo().with_persisted_session(DEMO_PUBLIC_EMAIL));
    block_on(store.bootstrap());

    let html = render_shell(&store, "/leaderboard");
    assert!(html.contains(r#"data-screen="app""#));
    assert!(html.contains(r#"data-route="/leaderboard""#));

    // Unknown paths fall back to the dashboard before the redirect lands.
    let html = render_shell(&store, "/nowhere");
    assert!(html.contains(r#"data-route="/dashboard""#));
    assert_eq!(
        screen_for(&store.snapshot(), "/nowhere").kind(),
        lingostreak_core::ScreenKind::App
    );
}

#[test]
fn mobile_menu_state_reaches_layout() {
    let store = store_over(InMemoryBackend::demo().with_persisted_session(DEMO_PUBLIC_EMAIL));
    block_on(store.bootstrap());
    let closed = render_screen(&store, "/guides", MobileNav::new("/guides"));
    assert!(closed.contains(r#"aria-expanded="false""#));
    let open = render_screen(&store, "/guides", MobileNav::new("/guides").toggled());
    assert!(open.contains(r#"aria-expanded="true""#));
    assert!(open.contains("primary-nav open"));
}

#[test]
fn degraded_profile_fetch_shows_notice_on_onboarding() {
    let backend = InMemoryBackend::demo();
    backend.fail_next_profile_fetches(1);
    let store = store_over(backend.with_persisted_session(DEMO_PUBLIC_EMAIL));
    block_on(store.bootstrap());
    assert_eq!(screen_for(&store.snapshot(), "/dashboard"), Screen::Onboarding);
    let html = render_screen(&store, "/dashboard", MobileNav::default());
    assert!(html.contains("couldn"));
    assert!(html.contains("Try again"));
}

#[test]
fn rejected_oauth_callback_is_shown_on_auth_screen() {
    let store = store_over(InMemoryBackend::demo().with_failing_restore(BackendError::new(
        BackendErrorKind::Unauthorized,
        "Access denied by Google",
    )));
    block_on(store.bootstrap());
    let html = render_shell(&store, "/dashboard");
    assert!(html.contains(r#"data-screen="auth""#));
    assert!(html.contains("auth-notice"));
    assert!(html.contains("Access denied by Google"));
}
