//! Gate evaluation for the current location and the side effects that follow
//! from it.
use crate::router::Route;
use lingostreak_core::gate::theme_applies;
use lingostreak_core::{GateInput, MobileNav, Screen, SessionSnapshot, ThemeMode, resolve};
use yew::prelude::*;
use yew_router::prelude::Navigator;

#[must_use]
pub fn screen_for(snapshot: &SessionSnapshot, path: &str) -> Screen {
    resolve(GateInput::from_snapshot(snapshot, path))
}

/// Canonical route to replace the location with, when the gate fell back to
/// the default view.
#[must_use]
pub fn redirect_for(screen: &Screen) -> Option<Route> {
    match screen {
        Screen::App(destination) if destination.redirected => {
            Some(Route::from_app(destination.route))
        }
        _ => None,
    }
}

/// Mobile menu state, closed again whenever the path changes.
#[hook]
pub fn use_mobile_nav(path: &str) -> UseStateHandle<MobileNav> {
    let nav = use_state(|| MobileNav::new(path));
    {
        let nav = nav.clone();
        use_effect_with(path.to_string(), move |path| {
            if let Some(next) = nav.observe_path(path) {
                nav.set(next);
            }
            || {}
        });
    }
    nav
}

/// Rewrite unknown authenticated paths to the default view.
#[hook]
pub fn use_redirect(screen: &Screen, navigator: Option<Navigator>) {
    use_effect_with(screen.clone(), move |screen| {
        if let (Some(navigator), Some(route)) = (navigator, redirect_for(screen)) {
            log::debug!("redirecting unknown path to {}", route.to_path());
            navigator.replace(&route);
        }
        || {}
    });
}

/// Keep the document theme in sync, except on public profile pages.
#[hook]
pub fn use_theme_effect(theme: ThemeMode, path: &str) {
    use_effect_with((theme, theme_applies(path)), |(theme, applies)| {
        #[cfg(target_arch = "wasm32")]
        {
            if *applies {
                crate::theme::apply_theme(*theme);
                crate::theme::persist_theme(*theme);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (theme, applies);
        }
        || {}
    });
}
