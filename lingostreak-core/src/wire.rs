//! JSON shapes spoken by the hosted auth (GoTrue) and data (PostgREST) APIs.
use crate::backend::OAuthProvider;
use crate::error::{BackendError, BackendErrorKind};
use crate::profile::{PublicProfile, UserProfile};
use crate::session::{Session, SessionUser, UserId};
use serde::{Deserialize, Serialize};
use url::Url;

/// Table holding one row per user.
pub const PROFILES_TABLE: &str = "profiles";
/// Columns exposed on public profile pages.
pub const PUBLIC_PROFILE_COLUMNS: &str = "username,display_name,target_language,avatar_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<WireUser> for SessionUser {
    fn from(user: WireUser) -> Self {
        Self {
            id: UserId::new(user.id),
            email: user.email,
        }
    }
}

/// Body of every `/token` grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: WireUser,
}

impl TokenResponse {
    /// Convert into a session, deriving the expiry from `expires_in` when the
    /// server did not send an absolute timestamp.
    #[must_use]
    pub fn into_session(self, now_secs: i64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now_secs.saturating_add(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| String::from("bearer")),
            expires_at,
            user: self.user.into(),
        }
    }
}

/// `/signup` answers with a full token grant when autoconfirm is on, or with
/// the bare user awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(TokenResponse),
    User(WireUser),
}

/// Error payloads; the auth and data APIs disagree on field names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<String> {
        self.error_code
            .clone()
            .or_else(|| match &self.code {
                Some(serde_json::Value::String(code)) => Some(code.clone()),
                _ => None,
            })
            .or_else(|| self.error.clone())
    }

    fn text(&self) -> Option<String> {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.message.clone())
            .filter(|text| !text.trim().is_empty())
    }
}

/// Map an HTTP failure onto the error taxonomy.
#[must_use]
pub fn classify_error(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code().unwrap_or_default();
    let kind = match code.as_str() {
        "invalid_credentials" | "invalid_grant" => BackendErrorKind::InvalidCredentials,
        "email_not_confirmed" => BackendErrorKind::EmailNotConfirmed,
        "user_already_exists" | "email_exists" | "23505" => BackendErrorKind::UserAlreadyExists,
        "weak_password" => BackendErrorKind::WeakPassword,
        "validation_failed" | "email_address_invalid" => BackendErrorKind::InvalidInput,
        "over_request_rate_limit" | "over_email_send_rate_limit" => BackendErrorKind::RateLimited,
        _ => match status {
            400 | 422 => BackendErrorKind::InvalidInput,
            401 | 403 => BackendErrorKind::Unauthorized,
            404 => BackendErrorKind::NotFound,
            409 => BackendErrorKind::UserAlreadyExists,
            429 => BackendErrorKind::RateLimited,
            _ => BackendErrorKind::Server,
        },
    };
    let message = parsed.text().unwrap_or_else(|| default_message(kind, status));
    BackendError::new(kind, message)
}

fn default_message(kind: BackendErrorKind, status: u16) -> String {
    match kind {
        BackendErrorKind::InvalidCredentials => String::from("Invalid login credentials"),
        BackendErrorKind::EmailNotConfirmed => String::from("Email not confirmed"),
        BackendErrorKind::UserAlreadyExists => String::from("User already registered"),
        BackendErrorKind::WeakPassword => String::from("Password is too weak"),
        BackendErrorKind::RateLimited => String::from("Too many requests, try again shortly"),
        _ => format!("Request failed with status {status}"),
    }
}

/// Rows are returned as arrays even for single-row lookups.
///
/// # Errors
///
/// Returns a server error when the body is not a row array.
pub fn parse_profile_rows(body: &str) -> Result<Option<UserProfile>, BackendError> {
    let rows: Vec<UserProfile> = serde_json::from_str(body)
        .map_err(|err| BackendError::server(format!("unreadable profile rows: {err}")))?;
    Ok(rows.into_iter().next())
}

/// # Errors
///
/// Returns a server error when the body is not a row array.
pub fn parse_public_profile_rows(body: &str) -> Result<Option<PublicProfile>, BackendError> {
    let rows: Vec<PublicProfile> = serde_json::from_str(body)
        .map_err(|err| BackendError::server(format!("unreadable profile rows: {err}")))?;
    Ok(rows.into_iter().next())
}

/// Request URLs derived from the configured project base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    fn join(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{path}"));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    fn token(&self, grant_type: &str) -> Url {
        let mut url = self.join("/auth/v1/token");
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        url
    }

    #[must_use]
    pub fn token_password(&self) -> Url {
        self.token("password")
    }

    #[must_use]
    pub fn token_pkce(&self) -> Url {
        self.token("pkce")
    }

    #[must_use]
    pub fn token_refresh(&self) -> Url {
        self.token("refresh_token")
    }

    #[must_use]
    pub fn signup(&self, redirect_to: Option<&str>) -> Url {
        let mut url = self.join("/auth/v1/signup");
        if let Some(redirect) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }
        url
    }

    /// Browser destination that starts the provider's consent screen.
    #[must_use]
    pub fn authorize(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
        code_challenge: &str,
    ) -> Url {
        let mut url = self.join("/auth/v1/authorize");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider.as_str());
            if let Some(redirect) = redirect_to {
                query.append_pair("redirect_to", redirect);
            }
            query
                .append_pair("code_challenge", code_challenge)
                .append_pair("code_challenge_method", "s256");
        }
        url
    }

    #[must_use]
    pub fn logout(&self) -> Url {
        self.join("/auth/v1/logout")
    }

    #[must_use]
    pub fn user(&self) -> Url {
        self.join("/auth/v1/user")
    }

    #[must_use]
    pub fn profiles(&self) -> Url {
        self.join(&format!("/rest/v1/{PROFILES_TABLE}"))
    }

    /// Insert-or-update keyed on the user id.
    #[must_use]
    pub fn profile_upsert(&self) -> Url {
        let mut url = self.profiles();
        url.query_pairs_mut().append_pair("on_conflict", "id");
        url
    }

    #[must_use]
    pub fn profile_by_id(&self, user_id: &UserId) -> Url {
        let mut url = self.profiles();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{user_id}"))
            .append_pair("limit", "1");
        url
    }

    #[must_use]
    pub fn profile_by_username(&self, username: &str) -> Url {
        let mut url = self.profiles();
        url.query_pairs_mut()
            .append_pair("select", PUBLIC_PROFILE_COLUMNS)
            .append_pair("username", &format!("eq.{}", username.to_lowercase()))
            .append_pair("onboarding_complete", "eq.true")
            .append_pair("limit", "1");
        url
    }
}

/// Body for the password grant.
#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for the PKCE code exchange.
#[derive(Debug, Serialize)]
pub struct PkceGrant<'a> {
    pub auth_code: &'a str,
    pub code_verifier: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new(Url::parse("https://project.example.co/").unwrap())
    }

    #[test]
    fn token_response_derives_expiry() {
        let body = r#"{"access_token":"a","refresh_token":"r","expires_in":3600,
            "user":{"id":"u1","email":"user@example.com"}}"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        let session = token.into_session(1_000);
        assert_eq!(session.expires_at, Some(4_600));
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.email(), Some("user@example.com"));
    }

    #[test]
    fn sign_up_response_is_session_or_user() {
        let pending: SignUpResponse =
            serde_json::from_str(r#"{"id":"u2","email":"new@example.com"}"#).unwrap();
        assert!(matches!(pending, SignUpResponse::User(_)));
        let active: SignUpResponse =
            serde_json::from_str(r#"{"access_token":"a","user":{"id":"u2"}}"#).unwrap();
        assert!(matches!(active, SignUpResponse::Session(_)));
    }

    #[test]
    fn errors_are_classified_by_code_then_status() {
        let err = classify_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.kind, BackendErrorKind::InvalidCredentials);
        assert_eq!(err.message, "Invalid login credentials");

        let err = classify_error(400, r#"{"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#);
        assert_eq!(err.kind, BackendErrorKind::EmailNotConfirmed);

        let err = classify_error(409, r#"{"code":"23505","message":"duplicate key"}"#);
        assert_eq!(err.kind, BackendErrorKind::UserAlreadyExists);

        assert_eq!(classify_error(429, "").kind, BackendErrorKind::RateLimited);
        assert_eq!(classify_error(401, "{}").kind, BackendErrorKind::Unauthorized);
        let err = classify_error(503, "<html>");
        assert_eq!(err.kind, BackendErrorKind::Server);
        assert_eq!(err.message, "Request failed with status 503");
    }

    #[test]
    fn profile_rows_take_the_first_row() {
        assert_eq!(parse_profile_rows("[]").unwrap(), None);
        let row = parse_profile_rows(r#"[{"id":"u1","username":"alice","onboarding_complete":true}]"#)
            .unwrap()
            .unwrap();
        assert!(row.is_onboarded());
        assert!(parse_public_profile_rows("{}").is_err());
    }

    #[test]
    fn endpoints_keep_base_path_and_encode_filters() {
        let nested = Endpoints::new(Url::parse("https://host.test/api/").unwrap());
        assert_eq!(
            nested.token_password().as_str(),
            "https://host.test/api/auth/v1/token?grant_type=password"
        );
        assert_eq!(
            endpoints().profile_by_id(&UserId::new("u1")).as_str(),
            "https://project.example.co/rest/v1/profiles?select=*&id=eq.u1&limit=1"
        );
        let authorize = endpoints().authorize(OAuthProvider::Google, Some("https://app.test/"), "ch");
        let pairs: Vec<(String, String)> = authorize.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".into(), "google".into())));
        assert!(pairs.contains(&("redirect_to".into(), "https://app.test/".into())));
        assert!(pairs.contains(&("code_challenge_method".into(), "s256".into())));
    }
}
