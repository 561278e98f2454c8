//! Backend selection for the browser build.
#[cfg(target_arch = "wasm32")]
mod remote;

#[cfg(target_arch = "wasm32")]
pub use remote::RemoteBackend;

use lingostreak_core::{AuthBackend, BackendConfig, ConfigError, InMemoryBackend};
use std::rc::Rc;

/// `localStorage` key for the serialized session.
pub const SESSION_STORAGE_KEY: &str = "lingostreak.session";
/// `localStorage` key for the PKCE verifier kept across the OAuth redirect.
pub const PKCE_VERIFIER_KEY: &str = "lingostreak.pkce_verifier";

/// Which backend a build talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Remote(BackendConfig),
    Demo,
}

impl BackendChoice {
    /// Misconfiguration falls back to the demo backend, loudly.
    #[must_use]
    pub fn from_config(config: Result<Option<BackendConfig>, ConfigError>) -> Self {
        match config {
            Ok(Some(config)) => Self::Remote(config),
            Ok(None) => {
                log::info!("no backend configured; using demo accounts");
                Self::Demo
            }
            Err(err) => {
                log::error!("backend configuration rejected ({err}); using demo accounts");
                Self::Demo
            }
        }
    }

    #[must_use]
    pub fn redirect_to(&self) -> Option<String> {
        match self {
            Self::Remote(config) => config.redirect_to.as_ref().map(ToString::to_string),
            Self::Demo => None,
        }
    }
}

/// Backend for this build: the hosted service when configured, demo accounts
/// otherwise (and always outside the browser).
#[must_use]
pub fn build_backend(choice: &BackendChoice) -> Rc<dyn AuthBackend> {
    match choice {
        #[cfg(target_arch = "wasm32")]
        BackendChoice::Remote(config) => Rc::new(RemoteBackend::new(config.clone())),
        #[cfg(not(target_arch = "wasm32"))]
        BackendChoice::Remote(config) => {
            log::warn!("remote backend at {} needs a browser; using demo accounts", config.url);
            Rc::new(InMemoryBackend::demo())
        }
        BackendChoice::Demo => Rc::new(InMemoryBackend::demo()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_config_degrades_to_demo() {
        assert_eq!(
            BackendChoice::from_config(Err(ConfigError::MissingAnonKey)),
            BackendChoice::Demo
        );
        assert_eq!(BackendChoice::from_config(Ok(None)).redirect_to(), None);
    }

    #[test]
    fn remote_choice_exposes_redirect() {
        let config = BackendConfig::from_values(
            Some("https://project.test"),
            Some("anon"),
            Some("https://app.test/"),
        )
        .unwrap();
        let choice = BackendChoice::from_config(Ok(config));
        assert_eq!(choice.redirect_to().as_deref(), Some("https://app.test/"));
    }

    #[test]
    fn native_builds_always_get_demo_accounts() {
        let backend = build_backend(&BackendChoice::Demo);
        let found = futures::executor::block_on(backend.fetch_public_profile("alice")).unwrap();
        assert!(found.is_some());
    }
}
