use crate::router::Route;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub to: Route,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub active: bool,
    /// Fired after navigation, e.g. to close the mobile menu.
    #[prop_or_default]
    pub on_navigate: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

/// Anchor with a real `href` that navigates client-side when a router is
/// mounted and falls back to a full page load otherwise.
#[function_component(NavLink)]
pub fn nav_link(props: &Props) -> Html {
    let navigator = use_navigator();
    let onclick = {
        let to = props.to.clone();
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(navigator) = navigator.as_ref() {
                e.prevent_default();
                navigator.push(&to);
            }
            on_navigate.emit(());
        })
    };
    let href = crate::config::href(&props.to.to_path());
    html! {
        <a
            {href}
            class={classes!("nav-link", props.class.clone(), props.active.then_some("active"))}
            aria-current={props.active.then_some("page")}
            {onclick}
        >
            { props.children.clone() }
        </a>
    }
}
