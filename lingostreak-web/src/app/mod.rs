use crate::app::context::AppContext;
use crate::pages::loading::LoadingScreen;
use lingostreak_core::Screen;
use yew::prelude::*;
use yew_router::prelude::*;

pub mod bootstrap;
pub mod context;
pub mod routing;
pub mod view;

pub use context::AppProvider;

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
pub fn app() -> Html {
    use crate::backend::{BackendChoice, build_backend};
    use lingostreak_core::SessionStore;

    let router_base = crate::config::router_base().map(AttrValue::from);
    let store = use_state(|| {
        let choice = BackendChoice::from_config(crate::config::backend_config());
        let store = SessionStore::new(build_backend(&choice), crate::theme::load_theme());
        match choice.redirect_to() {
            Some(redirect) => store.with_redirect_to(redirect),
            None => store,
        }
    });
    bootstrap::use_bootstrap(&store);
    html! {
        <BrowserRouter basename={router_base}>
            <AppProvider store={(*store).clone()}>
                <AppShell />
            </AppProvider>
        </BrowserRouter>
    }
}

/// Everything below the router: gate, redirects, theme and mobile menu.
/// Expects an [`AppProvider`] and a router above it.
#[function_component(AppShell)]
pub fn app_shell() -> Html {
    let context = use_context::<AppContext>();
    let location = use_location();
    let navigator = use_navigator();

    let path = location
        .as_ref()
        .map_or_else(|| String::from("/"), |loc| crate::config::app_path(loc.path()));
    let screen = context
        .as_ref()
        .map_or(Screen::Loading, |ctx| routing::screen_for(&ctx.snapshot, &path));
    let theme = context
        .as_ref()
        .map(|ctx| ctx.snapshot.theme)
        .unwrap_or_default();

    let nav = routing::use_mobile_nav(&path);
    routing::use_redirect(&screen, navigator);
    routing::use_theme_effect(theme, &path);

    let Some(context) = context else {
        log::error!("AppShell rendered without an AppProvider");
        return html! { <LoadingScreen /> };
    };
    let on_nav_change = {
        let nav = nav.clone();
        Callback::from(move |next: lingostreak_core::MobileNav| nav.set(next))
    };
    html! {
        <view::ScreenView {screen} {context} nav={(*nav).clone()} {on_nav_change} />
    }
}
