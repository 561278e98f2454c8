use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub message: AttrValue,
    #[prop_or_default]
    pub on_dismiss: Option<Callback<()>>,
    #[prop_or_default]
    pub on_retry: Option<Callback<()>>,
}

/// Inline banner for degraded background work.
#[function_component(Notice)]
pub fn notice(props: &Props) -> Html {
    let dismiss = props.on_dismiss.clone().map(|cb| {
        html! {
            <button type="button" class="btn btn-ghost btn-sm notice-dismiss"
                onclick={Callback::from(move |_| cb.emit(()))}>
                { "Dismiss" }
            </button>
        }
    });
    let retry = props.on_retry.clone().map(|cb| {
        html! {
            <button type="button" class="btn btn-sm notice-retry"
                onclick={Callback::from(move |_| cb.emit(()))}>
                { "Try again" }
            </button>
        }
    });
    html! {
        <div class="alert alert-warning notice" role="status" aria-live="polite">
            <span>{ props.message.clone() }</span>
            { for retry }
            { for dismiss }
        </div>
    }
}
