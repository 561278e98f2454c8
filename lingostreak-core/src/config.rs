//! Backend connection settings.
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("backend URL is set but the anon key is missing")]
    MissingAnonKey,
    #[error("anon key is set but the backend URL is missing")]
    MissingUrl,
    #[error("backend URL {value:?} is not valid: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("backend URL must use http or https (got {0})")]
    UnsupportedScheme(String),
    #[error("redirect target {value:?} is not valid: {reason}")]
    InvalidRedirect { value: String, reason: String },
}

/// Connection details for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: Url,
    pub anon_key: String,
    pub redirect_to: Option<Url>,
}

impl BackendConfig {
    /// Validate raw values. Blank values count as unset; with neither the URL
    /// nor the key set the result is `Ok(None)` and callers run in demo mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for half-configured or malformed settings.
    pub fn from_values(
        url: Option<&str>,
        anon_key: Option<&str>,
        redirect_to: Option<&str>,
    ) -> Result<Option<Self>, ConfigError> {
        let url = url.map(str::trim).filter(|v| !v.is_empty());
        let anon_key = anon_key.map(str::trim).filter(|v| !v.is_empty());
        let redirect_to = redirect_to.map(str::trim).filter(|v| !v.is_empty());

        let (url, anon_key) = match (url, anon_key) {
            (None, None) => return Ok(None),
            (Some(_), None) => return Err(ConfigError::MissingAnonKey),
            (None, Some(_)) => return Err(ConfigError::MissingUrl),
            (Some(url), Some(key)) => (url, key),
        };

        let parsed = Url::parse(url).map_err(|err| ConfigError::InvalidUrl {
            value: url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let redirect_to = redirect_to
            .map(|value| {
                Url::parse(value).map_err(|err| ConfigError::InvalidRedirect {
                    value: value.to_string(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;

        Ok(Some(Self {
            url: parsed,
            anon_key: anon_key.to_string(),
            redirect_to,
        }))
    }
}
