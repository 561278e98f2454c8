use lingostreak_core::ThemeMode;
use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct SettingsPageProps {
    pub theme: ThemeMode,
    #[prop_or_default]
    pub email: Option<AttrValue>,
    pub on_toggle_theme: Callback<()>,
    pub on_sign_out: Callback<()>,
}

#[function_component(SettingsPage)]
pub fn settings_page(props: &SettingsPageProps) -> Html {
    let on_toggle = {
        let cb = props.on_toggle_theme.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_sign_out = {
        let cb = props.on_sign_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <section class="settings space-y-4" aria-labelledby="settings-title">
            <h1 id="settings-title" class="text-3xl font-bold">{ "Settings" }</h1>
            if let Some(email) = props.email.clone() {
                <p class="account-email">{ format!("Account: {email}") }</p>
            }
            <label class="label cursor-pointer gap-4 w-fit">
                <span class="label-text">{ "Dark mode" }</span>
                <input
                    id="settings-dark-mode"
                    type="checkbox"
                    class="toggle"
                    checked={props.theme.is_dark()}
                    onchange={on_toggle}
                />
            </label>
            <button id="settings-sign-out" type="button" class="btn btn-error" onclick={on_sign_out}>
                { "Sign out" }
            </button>
        </section>
    }
}
