#[cfg(target_arch = "wasm32")]
use lingostreak_core::SessionStore;
#[cfg(target_arch = "wasm32")]
use yew::prelude::*;

/// Remove OAuth callback parameters from the address bar so a reload does
/// not replay them. The backend has already captured them.
#[cfg(target_arch = "wasm32")]
fn strip_callback_from_location() {
    let Some(cleaned) = crate::dom::current_url()
        .as_ref()
        .and_then(lingostreak_core::oauth::strip_callback_params)
    else {
        return;
    };
    if let Err(err) = crate::dom::replace_url(&cleaned) {
        log::warn!("could not clean callback parameters: {err}");
    }
}

/// Run once per mount: clean the URL, then restore the session and follow
/// auth notifications for the lifetime of the page.
#[cfg(target_arch = "wasm32")]
#[hook]
pub fn use_bootstrap(store: &SessionStore) {
    let store = store.clone();
    use_effect_with((), move |()| {
        strip_callback_from_location();
        wasm_bindgen_futures::spawn_local(async move {
            store.launch().await;
        });
        || {}
    });
}
