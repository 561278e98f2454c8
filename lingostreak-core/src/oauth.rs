//! OAuth redirect plumbing: callback parameter parsing, URL cleanup and PKCE.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use url::Url;

/// Parameters the provider may append to the redirect target, in the query
/// (authorization-code flow) or the fragment (implicit flow).
pub const CALLBACK_KEYS: [&str; 11] = [
    "code",
    "state",
    "access_token",
    "refresh_token",
    "expires_in",
    "expires_at",
    "token_type",
    "provider_token",
    "error",
    "error_code",
    "error_description",
];

/// Keys whose presence marks a location as an OAuth callback.
const MARKER_KEYS: [&str; 4] = ["code", "access_token", "error", "error_description"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
    pub token_type: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Collect callback parameters from both query and fragment.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        let fragment_pairs = url
            .fragment()
            .map(|f| url::form_urlencoded::parse(f.as_bytes()).into_owned().collect::<Vec<_>>())
            .unwrap_or_default();
        for (key, value) in url.query_pairs().into_owned().chain(fragment_pairs) {
            match key.as_str() {
                "code" => params.code = Some(value),
                "state" => params.state = Some(value),
                "access_token" => params.access_token = Some(value),
                "refresh_token" => params.refresh_token = Some(value),
                "expires_in" => params.expires_in = value.parse().ok(),
                "expires_at" => params.expires_at = value.parse().ok(),
                "token_type" => params.token_type = Some(value),
                "error" => params.error = Some(value),
                "error_description" => params.error_description = Some(value),
                _ => {}
            }
        }
        params
    }

    #[must_use]
    pub const fn is_callback(&self) -> bool {
        self.code.is_some()
            || self.access_token.is_some()
            || self.error.is_some()
            || self.error_description.is_some()
    }

    /// Provider-reported failure, readable.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
    }
}

#[must_use]
pub fn has_callback_params(url: &Url) -> bool {
    let in_query = url.query_pairs().any(|(k, _)| MARKER_KEYS.contains(&k.as_ref()));
    let in_fragment = url.fragment().is_some_and(|f| {
        url::form_urlencoded::parse(f.as_bytes()).any(|(k, _)| MARKER_KEYS.contains(&k.as_ref()))
    });
    in_query || in_fragment
}

/// Remove callback parameters from `url`, keeping everything else. Returns
/// `None` when the URL was not a callback, so callers can skip the history
/// rewrite.
#[must_use]
pub fn strip_callback_params(url: &Url) -> Option<Url> {
    if !has_callback_params(url) {
        return None;
    }
    let mut cleaned = url.clone();

    let kept_query: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| !CALLBACK_KEYS.contains(&k.as_str()))
        .collect();
    if kept_query.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept_query);
    }

    if let Some(fragment) = url.fragment() {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(fragment.as_bytes())
            .into_owned()
            .collect();
        let is_param_fragment = pairs.iter().any(|(k, _)| CALLBACK_KEYS.contains(&k.as_str()));
        if is_param_fragment {
            let kept: Vec<(String, String)> = pairs
                .into_iter()
                .filter(|(k, _)| !CALLBACK_KEYS.contains(&k.as_str()))
                .collect();
            if kept.is_empty() {
                cleaned.set_fragment(None);
            } else {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(kept)
                    .finish();
                cleaned.set_fragment(Some(&encoded));
            }
        }
    }
    Some(cleaned)
}

/// PKCE code verifier: 48 random bytes, base64url (64 characters).
#[must_use]
pub fn generate_code_verifier() -> String {
    let mut bytes = [0_u8; 48];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `BASE64URL(SHA256(verifier))`
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn detects_code_and_fragment_callbacks() {
        assert!(has_callback_params(&url("https://app.test/?code=abc")));
        assert!(has_callback_params(&url(
            "https://app.test/#access_token=t&refresh_token=r&expires_in=3600"
        )));
        assert!(!has_callback_params(&url("https://app.test/dashboard?tab=week")));
        assert!(!has_callback_params(&url("https://app.test/guides#verbs")));
    }

    #[test]
    fn strips_only_callback_parameters() {
        let cleaned =
            strip_callback_params(&url("https://app.test/dashboard?code=abc&state=xyz&tab=week"))
                .unwrap();
        assert_eq!(cleaned.as_str(), "https://app.test/dashboard?tab=week");

        let cleaned = strip_callback_params(&url(
            "https://app.test/#access_token=t&token_type=bearer&expires_in=3600",
        ))
        .unwrap();
        assert_eq!(cleaned.as_str(), "https://app.test/");

        assert!(strip_callback_params(&url("https://app.test/feed#top")).is_none());
    }

    #[test]
    fn parses_params_from_both_locations() {
        let params = CallbackParams::from_url(&url(
            "https://app.test/?code=c1#access_token=t&expires_in=60&error_description=Denied",
        ));
        assert_eq!(params.code.as_deref(), Some("c1"));
        assert_eq!(params.access_token.as_deref(), Some("t"));
        assert_eq!(params.expires_in, Some(60));
        assert!(params.is_callback());
        assert_eq!(params.error_message().as_deref(), Some("Denied"));
        assert!(!CallbackParams::from_url(&url("https://app.test/")).is_callback());
    }

    #[test]
    fn bare_provider_error_is_a_callback() {
        let denied = url("https://app.test/dashboard?error=access_denied");
        assert!(has_callback_params(&denied));
        assert_eq!(
            strip_callback_params(&denied).unwrap().as_str(),
            "https://app.test/dashboard"
        );
        let params = CallbackParams::from_url(&denied);
        assert!(params.is_callback());
        assert_eq!(params.error_message().as_deref(), Some("access_denied"));

        let in_fragment = url("https://app.test/#error=server_error&tab=week");
        assert_eq!(
            strip_callback_params(&in_fragment).unwrap().as_str(),
            "https://app.test/#tab=week"
        );
    }

    #[test]
    fn pkce_verifier_and_challenge() {
        let verifier = generate_code_verifier();
        assert_eq!(verifier.len(), 64);
        assert!(
            verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(verifier, generate_code_verifier());
        // RFC 7636 appendix B
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mJ92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URXbGwrA-cM-cM"
        );
    }
}
