//! Build-time configuration.
//!
//! Values are baked in through `option_env!` when the bundle is compiled:
//! `LINGOSTREAK_BACKEND_URL`, `LINGOSTREAK_ANON_KEY` and
//! `LINGOSTREAK_REDIRECT_TO` select the hosted backend; `PUBLIC_URL` sets the
//! router base when the app is served from a subdirectory.
use lingostreak_core::{BackendConfig, ConfigError};

/// Hosted backend settings, `Ok(None)` for the offline demo build.
///
/// # Errors
///
/// Returns [`ConfigError`] when only part of the backend settings were provided.
pub fn backend_config() -> Result<Option<BackendConfig>, ConfigError> {
    BackendConfig::from_values(
        option_env!("LINGOSTREAK_BACKEND_URL"),
        option_env!("LINGOSTREAK_ANON_KEY"),
        option_env!("LINGOSTREAK_REDIRECT_TO"),
    )
}

/// Base path for the router (e.g. `/app` when hosted under a subdirectory).
///
/// Returns `None` when no base path is configured so the router falls back to root.
#[must_use]
pub fn router_base() -> Option<String> {
    router_base_with_base(option_env!("PUBLIC_URL").unwrap_or(""))
}

fn router_base_with_base(base: &str) -> Option<String> {
    let base = base.trim().trim_end_matches('/');
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// Absolute path for `route_path`, honouring the router base.
#[must_use]
pub fn href(route_path: &str) -> String {
    href_with_base(route_path, router_base().as_deref())
}

fn href_with_base(route_path: &str, base: Option<&str>) -> String {
    let path = route_path.trim_start_matches('/');
    match base {
        Some(base) => format!("{base}/{path}"),
        None => format!("/{path}"),
    }
}

/// Strip the router base from a browser path.
#[must_use]
pub fn app_path(location_path: &str) -> String {
    app_path_with_base(location_path, router_base().as_deref())
}

fn app_path_with_base(location_path: &str, base: Option<&str>) -> String {
    let stripped = base
        .and_then(|base| location_path.strip_prefix(base))
        .unwrap_or(location_path);
    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_base_is_none_by_default() {
        assert_eq!(router_base(), None);
        assert_eq!(router_base_with_base(" / "), None);
    }

    #[test]
    fn router_base_returns_trimmed_value() {
        assert_eq!(router_base_with_base("/app/"), Some(String::from("/app")));
    }

    #[test]
    fn hrefs_and_app_paths_respect_base() {
        assert_eq!(href_with_base("/feed", None), "/feed");
        assert_eq!(href_with_base("feed", Some("/app")), "/app/feed");
        assert_eq!(app_path_with_base("/app/profile/alice", Some("/app")), "/profile/alice");
        assert_eq!(app_path_with_base("/app", Some("/app")), "/");
        assert_eq!(app_path_with_base("/dashboard", None), "/dashboard");
    }

    #[test]
    fn unconfigured_build_runs_in_demo_mode() {
        // CI builds do not set the backend variables.
        if option_env!("LINGOSTREAK_BACKEND_URL").is_none()
            && option_env!("LINGOSTREAK_ANON_KEY").is_none()
        {
            assert_eq!(backend_config(), Ok(None));
        }
    }
}
