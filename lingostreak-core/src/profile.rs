//! User profiles and the onboarding form that creates them.
use crate::session::UserId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_DAILY_GOAL_MINUTES: u32 = 5;
pub const MAX_DAILY_GOAL_MINUTES: u32 = 240;
pub const DEFAULT_DAILY_GOAL_MINUTES: u32 = 15;

static USERNAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z0-9_]{3,20}$").ok());

/// Check a normalized (trimmed, lower-cased) username.
#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE
        .as_ref()
        .is_some_and(|re| re.is_match(username))
}

/// Profile row owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub native_language: Option<String>,
    #[serde(default)]
    pub daily_goal_minutes: Option<u32>,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// A profile only counts once onboarding has finished.
    #[must_use]
    pub fn is_onboarded(&self) -> bool {
        self.onboarding_complete && !self.username.is_empty()
    }

    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }

    #[must_use]
    pub fn daily_goal(&self) -> u32 {
        self.daily_goal_minutes
            .unwrap_or(DEFAULT_DAILY_GOAL_MINUTES)
    }

    #[must_use]
    pub fn public_view(&self) -> PublicProfile {
        PublicProfile {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            target_language: self.target_language.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Subset of a profile visible on `/profile/:username` without signing in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("username must be 3-20 characters of lowercase letters, digits or underscores")]
    InvalidUsername,
    #[error("pick the language you want to learn")]
    MissingTargetLanguage,
    #[error("daily goal must be between {min} and {max} minutes (got {value})")]
    DailyGoalOutOfRange { value: u32, min: u32, max: u32 },
}

/// Onboarding form contents before they become a [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub username: String,
    pub display_name: String,
    pub target_language: String,
    pub native_language: String,
    pub daily_goal_minutes: u32,
}

impl ProfileDraft {
    #[must_use]
    pub fn new(username: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            target_language: target_language.into(),
            daily_goal_minutes: DEFAULT_DAILY_GOAL_MINUTES,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn normalized_username(&self) -> String {
        self.username.trim().to_lowercase()
    }

    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !is_valid_username(&self.normalized_username()) {
            return Err(ProfileError::InvalidUsername);
        }
        if self.target_language.trim().is_empty() {
            return Err(ProfileError::MissingTargetLanguage);
        }
        if !(MIN_DAILY_GOAL_MINUTES..=MAX_DAILY_GOAL_MINUTES).contains(&self.daily_goal_minutes) {
            return Err(ProfileError::DailyGoalOutOfRange {
                value: self.daily_goal_minutes,
                min: MIN_DAILY_GOAL_MINUTES,
                max: MAX_DAILY_GOAL_MINUTES,
            });
        }
        Ok(())
    }

    /// Validate and convert into a completed profile for `id`.
    ///
    /// # Errors
    ///
    /// Propagates [`ProfileDraft::validate`] failures.
    pub fn into_profile(self, id: UserId) -> Result<UserProfile, ProfileError> {
        self.validate()?;
        let username = self.normalized_username();
        Ok(UserProfile {
            id,
            username,
            display_name: non_empty(self.display_name),
            target_language: non_empty(self.target_language),
            native_language: non_empty(self.native_language),
            daily_goal_minutes: Some(self.daily_goal_minutes),
            onboarding_complete: true,
            avatar_url: None,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("polyglot_42"));
        assert!(!is_valid_username("al"));
        assert!(!is_valid_username("Alice"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("a".repeat(21).as_str()));
    }

    #[test]
    fn draft_normalizes_and_completes_onboarding() {
        let mut draft = ProfileDraft::new("  Alice_B ", "es");
        draft.display_name = "  ".into();
        draft.native_language = "en".into();
        let profile = draft.into_profile(UserId::new("u1")).unwrap();
        assert_eq!(profile.username, "alice_b");
        assert!(profile.display_name.is_none());
        assert_eq!(profile.native_language.as_deref(), Some("en"));
        assert!(profile.is_onboarded());
        assert_eq!(profile.display_label(), "alice_b");
    }

    #[test]
    fn draft_reports_first_invalid_field() {
        let draft = ProfileDraft::new("ok_name", " ");
        assert_eq!(draft.validate(), Err(ProfileError::MissingTargetLanguage));

        let mut draft = ProfileDraft::new("ok_name", "fr");
        draft.daily_goal_minutes = 1;
        assert!(matches!(
            draft.validate(),
            Err(ProfileError::DailyGoalOutOfRange { value: 1, .. })
        ));

        let draft = ProfileDraft::new("x", "fr");
        assert_eq!(draft.validate(), Err(ProfileError::InvalidUsername));
    }

    #[test]
    fn incomplete_rows_are_not_onboarded() {
        let row: UserProfile =
            serde_json::from_str(r#"{"id":"u1","username":"alice"}"#).unwrap();
        assert!(!row.is_onboarded());
        assert_eq!(row.daily_goal(), DEFAULT_DAILY_GOAL_MINUTES);
        assert_eq!(row.public_view().username, "alice");
    }
}
