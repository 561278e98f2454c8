//! HTTP client for the hosted auth and profile service.
use super::{PKCE_VERIFIER_KEY, SESSION_STORAGE_KEY};
use crate::dom;
use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use lingostreak_core::oauth::{self, CallbackParams};
use lingostreak_core::wire::{
    self, Endpoints, PasswordGrant, PkceGrant, RefreshGrant, SignUpResponse, TokenResponse,
    WireUser,
};
use lingostreak_core::{
    AuthBackend, AuthEvent, AuthEventSender, BackendConfig, BackendError, BackendErrorKind,
    OAuthProvider, PublicProfile, Session, SignUpOutcome, UserId, UserProfile,
};
use serde::Serialize;
use std::cell::RefCell;

/// Refresh sessions that expire within this many seconds.
const EXPIRY_MARGIN_SECS: i64 = 30;

pub struct RemoteBackend {
    config: BackendConfig,
    endpoints: Endpoints,
    session: RefCell<Option<Session>>,
    subscribers: RefCell<Vec<AuthEventSender>>,
    callback: RefCell<Option<CallbackParams>>,
}

impl RemoteBackend {
    /// Capture OAuth callback parameters from the current location before the
    /// app strips them, and load any stored session.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        let callback = dom::current_url()
            .map(|url| CallbackParams::from_url(&url))
            .filter(CallbackParams::is_callback);
        if callback.is_some() {
            log::debug!("captured OAuth callback parameters");
        }
        let stored = dom::storage_get(SESSION_STORAGE_KEY).and_then(|raw| {
            serde_json::from_str::<Session>(&raw)
                .map_err(|err| log::warn!("discarding unreadable stored session: {err}"))
                .ok()
        });
        Self {
            endpoints: Endpoints::new(config.url.clone()),
            config,
            session: RefCell::new(stored),
            subscribers: RefCell::new(Vec::new()),
            callback: RefCell::new(callback),
        }
    }

    fn emit(&self, event: &AuthEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|sender| sender.unbounded_send(event.clone()).is_ok());
    }

    fn store_session(&self, session: Option<Session>) {
        match &session {
            Some(session) => match serde_json::to_string(session) {
                Ok(raw) => dom::storage_set(SESSION_STORAGE_KEY, &raw),
                Err(err) => log::warn!("could not serialize session: {err}"),
            },
            None => dom::storage_remove(SESSION_STORAGE_KEY),
        }
        *self.session.borrow_mut() = session;
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn authorize(&self, builder: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.config.anon_key);
        builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", &format!("Bearer {token}"))
    }

    async fn send(request: Result<Request, gloo_net::Error>) -> Result<String, BackendError> {
        let request = request.map_err(|err| BackendError::network(err.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::network(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| BackendError::network(err.to_string()))?;
        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(wire::classify_error(status, &body))
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        url: &url::Url,
        body: &T,
        bearer: Option<&str>,
    ) -> Result<String, BackendError> {
        let builder = self.authorize(Request::post(url.as_str()), bearer);
        Self::send(builder.json(body)).await
    }

    async fn get(&self, url: &url::Url, bearer: Option<&str>) -> Result<String, BackendError> {
        let builder = self.authorize(Request::get(url.as_str()), bearer);
        Self::send(builder.build()).await
    }

    fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
        serde_json::from_str(body)
            .map_err(|err| BackendError::server(format!("unexpected response: {err}")))
    }

    async fn grant<T: Serialize>(&self, url: &url::Url, body: &T) -> Result<Session, BackendError> {
        let raw = self.post_json(url, body, None).await?;
        let token: TokenResponse = Self::parse(&raw)?;
        Ok(token.into_session(dom::now_secs()))
    }

    async fn exchange_callback(&self, params: CallbackParams) -> Result<Session, BackendError> {
        if let Some(message) = params.error_message() {
            return Err(BackendError::new(BackendErrorKind::Unauthorized, message));
        }
        if let Some(code) = params.code.as_deref() {
            let verifier = dom::storage_get(PKCE_VERIFIER_KEY).ok_or_else(|| {
                BackendError::new(
                    BackendErrorKind::InvalidInput,
                    "Sign-in link expired, please try again",
                )
            })?;
            dom::storage_remove(PKCE_VERIFIER_KEY);
            let grant = PkceGrant {
                auth_code: code,
                code_verifier: &verifier,
            };
            return self.grant(&self.endpoints.token_pkce(), &grant).await;
        }
        let access_token = params
            .access_token
            .ok_or_else(|| BackendError::server("callback carried no credentials"))?;
        let raw = self.get(&self.endpoints.user(), Some(&access_token)).await?;
        let user: WireUser = Self::parse(&raw)?;
        let now = dom::now_secs();
        Ok(Session {
            access_token,
            refresh_token: params.refresh_token,
            token_type: params.token_type.unwrap_or_else(|| String::from("bearer")),
            expires_at: params
                .expires_at
                .or_else(|| params.expires_in.map(|secs| now + secs)),
            user: user.into(),
        })
    }

    async fn refresh(&self, session: &Session) -> Result<Session, BackendError> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| BackendError::new(BackendErrorKind::Unauthorized, "Session expired"))?;
        self.grant(&self.endpoints.token_refresh(), &RefreshGrant { refresh_token })
            .await
    }
}

#[async_trait(?Send)]
impl AuthBackend for RemoteBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let session = self
            .grant(&self.endpoints.token_password(), &PasswordGrant { email, password })
            .await?;
        self.store_session(Some(session.clone()));
        self.emit(&AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let raw = self
            .post_json(
                &self.endpoints.signup(redirect_to),
                &PasswordGrant { email, password },
                None,
            )
            .await?;
        match Self::parse::<SignUpResponse>(&raw)? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(dom::now_secs());
                self.store_session(Some(session.clone()));
                self.emit(&AuthEvent::signed_in(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationPending {
                email: user.email.unwrap_or_else(|| email.to_string()),
            }),
        }
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<(), BackendError> {
        let verifier = oauth::generate_code_verifier();
        dom::storage_set(PKCE_VERIFIER_KEY, &verifier);
        let fallback = dom::current_url().map(|url| {
            let mut url = url;
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        });
        let redirect = redirect_to.map(str::to_string).or(fallback);
        let target = self.endpoints.authorize(
            provider,
            redirect.as_deref(),
            &oauth::code_challenge(&verifier),
        );
        dom::assign_location(&target).map_err(|err| BackendError::network(err.to_string()))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.access_token();
        self.store_session(None);
        self.emit(&AuthEvent::signed_out());
        let Some(token) = token else {
            return Ok(());
        };
        self.post_json(&self.endpoints.logout(), &serde_json::json!({}), Some(&token))
            .await
            .map(|_| ())
    }

    async fn persisted_session(&self) -> Result<Option<Session>, BackendError> {
        let callback = self.callback.borrow_mut().take();
        if let Some(params) = callback {
            let session = self.exchange_callback(params).await?;
            self.store_session(Some(session.clone()));
            return Ok(Some(session));
        }

        let stored = self.session.borrow().clone();
        let Some(stored) = stored else {
            return Ok(None);
        };
        if !stored.is_expired(dom::now_secs() + EXPIRY_MARGIN_SECS) {
            return Ok(Some(stored));
        }
        match self.refresh(&stored).await {
            Ok(session) => {
                self.store_session(Some(session.clone()));
                self.emit(&AuthEvent::refreshed(session.clone()));
                Ok(Some(session))
            }
            Err(err) if err.kind == BackendErrorKind::Network => Err(err),
            Err(err) => {
                log::warn!("stored session could not be refreshed: {err}");
                self.store_session(None);
                Ok(None)
            }
        }
    }

    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        let token = self.access_token();
        let raw = self
            .get(&self.endpoints.profile_by_id(user_id), token.as_deref())
            .await?;
        wire::parse_profile_rows(&raw)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile, BackendError> {
        let token = self.access_token().ok_or_else(|| {
            BackendError::new(BackendErrorKind::Unauthorized, "You need to sign in first")
        })?;
        let builder = self
            .authorize(
                Request::post(self.endpoints.profile_upsert().as_str()),
                Some(&token),
            )
            .header("Prefer", "resolution=merge-duplicates,return=representation");
        let raw = Self::send(builder.json(profile)).await?;
        Ok(wire::parse_profile_rows(&raw)?.unwrap_or_else(|| profile.clone()))
    }

    async fn fetch_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, BackendError> {
        let raw = self
            .get(&self.endpoints.profile_by_username(username), None)
            .await?;
        wire::parse_public_profile_rows(&raw)
    }

    fn subscribe(&self, events: AuthEventSender) {
        self.subscribers.borrow_mut().push(events);
    }
}
