//! Store handle and live snapshot shared with every screen.
use lingostreak_core::{SessionSnapshot, SessionStore};
use std::rc::Rc;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub store: SessionStore,
    pub snapshot: Rc<SessionSnapshot>,
}

#[derive(Properties, PartialEq)]
pub struct AppProviderProps {
    pub store: SessionStore,
    #[prop_or_default]
    pub children: Html,
}

/// Mirrors the store into component state for as long as it is mounted.
#[function_component(AppProvider)]
pub fn app_provider(props: &AppProviderProps) -> Html {
    let snapshot = use_state(|| Rc::new(props.store.snapshot()));
    {
        let snapshot = snapshot.clone();
        use_effect_with(props.store.clone(), move |store| {
            // Changes made before the subscription existed.
            snapshot.set(Rc::new(store.snapshot()));
            let setter = snapshot.setter();
            let id = store.subscribe(move |next| setter.set(Rc::new(next.clone())));
            let store = store.clone();
            move || store.unsubscribe(id)
        });
    }
    let context = AppContext {
        store: props.store.clone(),
        snapshot: (*snapshot).clone(),
    };
    html! {
        <ContextProvider<AppContext> {context}>
            { props.children.clone() }
        </ContextProvider<AppContext>>
    }
}
