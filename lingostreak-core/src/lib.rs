//! Lingostreak core
//!
//! Platform-agnostic session, profile and route-gating logic for the Lingostreak
//! habit tracker. This crate has no UI or browser dependencies; the web shell
//! and the QA tester both drive it through [`SessionStore`] and [`gate::resolve`].

pub mod audit;
pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod memory;
pub mod nav;
pub mod oauth;
pub mod profile;
pub mod routes;
pub mod session;
pub mod store;
pub mod theme;
pub mod wire;

// Re-export commonly used types
pub use audit::{InvariantViolation, SnapshotRecorder};
pub use backend::{
    AuthBackend, AuthEvent, AuthEventKind, AuthEventSender, AuthEvents, OAuthProvider,
    SignUpOutcome, auth_channel,
};
pub use config::{BackendConfig, ConfigError};
pub use error::{AuthFailure, BackendError, BackendErrorKind, IntegrityViolation};
pub use gate::{Destination, GateInput, Screen, ScreenKind, resolve};
pub use memory::InMemoryBackend;
pub use nav::MobileNav;
pub use profile::{ProfileDraft, ProfileError, PublicProfile, UserProfile};
pub use routes::AppRoute;
pub use session::{Session, SessionUser, UserId};
pub use store::{
    Generation, ListenerId, ProfileRequest, SessionAction, SessionSnapshot, SessionState,
    SessionStore,
};
pub use theme::ThemeMode;
