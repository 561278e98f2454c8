use lingostreak_core::gate::ScreenKind;
use yew::prelude::*;

/// Shown until the first session resolution finishes.
#[function_component(LoadingScreen)]
pub fn loading_screen() -> Html {
    html! {
        <div
            class="min-h-screen flex items-center justify-center"
            data-screen={ScreenKind::Loading.marker()}
            aria-busy="true"
            aria-live="polite"
        >
            <span class="loading loading-spinner loading-lg" role="progressbar"></span>
            <span class="sr-only">{ "Loading your session…" }</span>
        </div>
    }
}
