//! Authenticated shell: header, navigation, mobile menu, theme toggle, sign out.
use crate::components::nav_link::NavLink;
use crate::router::Route;
use lingostreak_core::gate::ScreenKind;
use lingostreak_core::{AppRoute, MobileNav, ThemeMode};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub current: AppRoute,
    pub user_label: AttrValue,
    pub theme: ThemeMode,
    pub nav: MobileNav,
    pub on_toggle_nav: Callback<()>,
    pub on_close_nav: Callback<()>,
    pub on_toggle_theme: Callback<()>,
    pub on_sign_out: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

fn nav_items(props: &Props) -> Html {
    AppRoute::ALL
        .into_iter()
        .map(|route| {
            html! {
                <li key={route.path()}>
                    <NavLink
                        to={Route::from_app(route)}
                        active={route == props.current}
                        on_navigate={props.on_close_nav.clone()}
                    >
                        { route.label() }
                    </NavLink>
                </li>
            }
        })
        .collect()
}

#[function_component(AppLayout)]
pub fn app_layout(props: &Props) -> Html {
    let toggle_nav = {
        let cb = props.on_toggle_nav.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let toggle_theme = {
        let cb = props.on_toggle_theme.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let sign_out = {
        let cb = props.on_sign_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let menu_open = props.nav.is_open();
    let theme_label = if props.theme.is_dark() {
        "Light mode"
    } else {
        "Dark mode"
    };

    html! {
        <div class="app-shell min-h-screen" data-screen={ScreenKind::App.marker()} data-route={props.current.path()}>
            <header class="navbar" role="banner">
                <button
                    type="button"
                    id="mobile-menu-toggle"
                    class="btn btn-ghost lg:hidden"
                    aria-expanded={menu_open.to_string()}
                    aria-controls="primary-nav"
                    onclick={toggle_nav}
                >
                    { "Menu" }
                </button>
                <span class="brand font-bold">{ "Lingostreak" }</span>
                <span class="user-label">{ props.user_label.clone() }</span>
                <button type="button" id="theme-toggle" class="btn btn-ghost" onclick={toggle_theme}>
                    { theme_label }
                </button>
                <button type="button" id="sign-out" class="btn btn-ghost" onclick={sign_out}>
                    { "Sign out" }
                </button>
            </header>
            <nav
                id="primary-nav"
                aria-label="Primary"
                class={classes!("primary-nav", menu_open.then_some("open"))}
            >
                <ul class="menu">{ nav_items(props) }</ul>
            </nav>
            <main id="main" role="main">
                { props.children.clone() }
            </main>
        </div>
    }
}
