//! Sign-in / sign-up screen.
use lingostreak_core::gate::ScreenKind;
use lingostreak_core::{AuthFailure, SessionStore, SignUpOutcome};
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Welcome back",
            Self::SignUp => "Create your account",
        }
    }

    #[must_use]
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignUp => "Sign up",
        }
    }

    #[must_use]
    pub const fn switch_label(self) -> &'static str {
        match self {
            Self::SignIn => "New here? Create an account",
            Self::SignUp => "Already have an account? Sign in",
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }
}

/// Message for the user after sign-up; `None` when the session took over.
#[must_use]
pub fn sign_up_message(outcome: &SignUpOutcome) -> Option<String> {
    match outcome {
        SignUpOutcome::SignedIn(_) => None,
        SignUpOutcome::ConfirmationPending { email } => Some(format!(
            "Check {email} for a confirmation link, then sign in."
        )),
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct AuthPageProps {
    pub store: SessionStore,
    #[prop_or_default]
    pub initial_mode: AuthMode,
    /// Failure reported by the store, e.g. a rejected OAuth callback.
    #[prop_or_default]
    pub notice: Option<AttrValue>,
}

#[function_component(AuthPage)]
pub fn auth_page(props: &AuthPageProps) -> Html {
    let mode = use_state(|| props.initial_mode);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let error = use_state(|| None::<String>);
    let info = use_state(|| None::<String>);
    let busy = use_state(|| false);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            email.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            password.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_switch = {
        let mode = mode.clone();
        let error = error.clone();
        let info = info.clone();
        Callback::from(move |_| {
            mode.set(mode.other());
            error.set(None);
            info.set(None);
        })
    };

    let on_submit = {
        let store = props.store.clone();
        let (mode, email, password) = (mode.clone(), email.clone(), password.clone());
        let (error, info, busy) = (error.clone(), info.clone(), busy.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *busy {
                return;
            }
            store.dismiss_notice();
            busy.set(true);
            error.set(None);
            info.set(None);
            let store = store.clone();
            let (mode, email, password) = (*mode, (*email).clone(), (*password).clone());
            let (error, info, busy) = (error.clone(), info.clone(), busy.clone());
            spawn_local(async move {
                let result: Result<Option<String>, AuthFailure> = match mode {
                    AuthMode::SignIn => store
                        .sign_in_with_password(&email, &password)
                        .await
                        .map(|_| None),
                    AuthMode::SignUp => store
                        .sign_up(&email, &password)
                        .await
                        .map(|outcome| sign_up_message(&outcome)),
                };
                match result {
                    Ok(message) => info.set(message),
                    Err(err) => {
                        log::debug!("{} failed: {err}", mode.submit_label());
                        error.set(Some(err.message()));
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_google = {
        let store = props.store.clone();
        let error = error.clone();
        Callback::from(move |_| {
            let store = store.clone();
            let error = error.clone();
            spawn_local(async move {
                if let Err(err) = store.sign_in_with_google().await {
                    error.set(Some(err.message()));
                }
            });
        })
    };

    let on_dismiss_notice = {
        let store = props.store.clone();
        Callback::from(move |_| store.dismiss_notice())
    };

    let current = *mode;
    html! {
        <section class="auth-page min-h-screen flex items-center justify-center" data-screen={ScreenKind::Auth.marker()}>
            <div class="card w-full max-w-sm shadow-xl">
                <form class="card-body" onsubmit={on_submit} data-mode={if current == AuthMode::SignIn { "sign-in" } else { "sign-up" }}>
                    <h1 class="card-title">{ current.title() }</h1>
                    if let Some(message) = props.notice.clone() {
                        <div class="alert alert-error" role="alert" id="auth-notice">
                            <span>{ message }</span>
                            <button type="button" class="btn btn-ghost btn-sm" onclick={on_dismiss_notice}>
                                { "Dismiss" }
                            </button>
                        </div>
                    }
                    if let Some(message) = (*error).clone() {
                        <div class="alert alert-error" role="alert" id="auth-error">{ message }</div>
                    }
                    if let Some(message) = (*info).clone() {
                        <div class="alert alert-info" role="status" id="auth-info">{ message }</div>
                    }
                    <label class="form-control">
                        <span class="label-text">{ "Email" }</span>
                        <input id="auth-email" type="email" class="input input-bordered"
                            autocomplete="email" value={(*email).clone()} oninput={on_email} />
                    </label>
                    <label class="form-control">
                        <span class="label-text">{ "Password" }</span>
                        <input id="auth-password" type="password" class="input input-bordered"
                            autocomplete={if current == AuthMode::SignIn { "current-password" } else { "new-password" }}
                            value={(*password).clone()} oninput={on_password} />
                    </label>
                    <button id="auth-submit" type="submit" class="btn btn-primary" disabled={*busy}>
                        { current.submit_label() }
                    </button>
                    <button id="auth-google" type="button" class="btn btn-outline" onclick={on_google}>
                        { "Continue with Google" }
                    </button>
                    <button id="auth-switch" type="button" class="btn btn-link" onclick={on_switch}>
                        { current.switch_label() }
                    </button>
                </form>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingostreak_core::{Session, UserId};

    #[test]
    fn modes_flip_and_label() {
        assert_eq!(AuthMode::default().other(), AuthMode::SignUp);
        assert_eq!(AuthMode::SignUp.submit_label(), "Sign up");
    }

    #[test]
    fn pending_confirmation_tells_user_where_to_look() {
        let pending = SignUpOutcome::ConfirmationPending {
            email: "new@example.com".into(),
        };
        assert!(sign_up_message(&pending).unwrap().contains("new@example.com"));
        let active = SignUpOutcome::SignedIn(Session::bearer("t", UserId::new("u"), None));
        assert_eq!(sign_up_message(&active), None);
    }
}
