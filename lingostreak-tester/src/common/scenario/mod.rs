use anyhow::Result;
use thirtyfour::prelude::*;

pub mod public_profile;
pub mod session_flows;
pub mod smoke;

/// Logic check run once per iteration with that iteration's seed.
pub type LogicCheck = fn(u64) -> Result<()>;

#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub base_url: String,
    pub seed: u64,
    pub verbose: bool,
}

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub check: LogicCheck,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, check: LogicCheck) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

// Browser test scenario
#[async_trait::async_trait]
pub trait BrowserScenario {
    async fn run_browser(&self, driver: &WebDriver, ctx: &ScenarioCtx) -> Result<()>;
}

// Combined scenario that can run both logic and browser tests
pub trait CombinedScenario: BrowserScenario {
    fn as_logic_scenario(&self) -> Option<TestScenario>;

    fn has_browser_flow(&self) -> bool {
        true
    }
}

/// Scenario that only exercises the session store.
#[derive(Clone)]
pub struct LogicScenario {
    name: &'static str,
    check: LogicCheck,
}

impl LogicScenario {
    pub const fn new(name: &'static str, check: LogicCheck) -> Self {
        Self { name, check }
    }
}

#[async_trait::async_trait]
impl BrowserScenario for LogicScenario {
    async fn run_browser(&self, _driver: &WebDriver, _ctx: &ScenarioCtx) -> Result<()> {
        anyhow::bail!("{} has no browser flow", self.name)
    }
}

impl CombinedScenario for LogicScenario {
    fn as_logic_scenario(&self) -> Option<TestScenario> {
        Some(TestScenario::new(self.name, self.check))
    }

    fn has_browser_flow(&self) -> bool {
        false
    }
}

const CATALOG: [(&str, &str); 13] = [
    ("smoke", "No persisted session: loading, then the auth screen"),
    ("public-profile", "/profile/alice renders without signing in"),
    ("password-sign-in", "Password sign-in without a profile lands on onboarding"),
    ("onboarding", "Finishing onboarding opens the app without a reload"),
    ("late-profile-response", "A profile answer arriving after sign-out is dropped"),
    ("sign-out-idempotent", "Signing out twice equals signing out once"),
    ("sign-up-confirmation", "Sign-up awaiting email confirmation stays signed out"),
    ("rejected-credentials", "Bad credentials are rejected without state changes"),
    ("offline-sign-in", "An unreachable backend reports unavailability"),
    ("degraded-profile", "A failed profile fetch degrades to onboarding with a notice"),
    ("google-oauth", "Google sign-in arrives through the auth event channel"),
    ("session-restore", "A persisted session is restored on start"),
    ("event-storm", "Seeded random actions and notifications keep every invariant"),
];

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.to_vec()
}

pub fn scenario_keys() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(key, _)| *key)
}

pub fn get_scenario(name: &str) -> Option<Box<dyn CombinedScenario + Send + Sync>> {
    use session_flows as flows;

    let logic = |name: &'static str, check: LogicCheck| -> Option<Box<dyn CombinedScenario + Send + Sync>> {
        Some(Box::new(LogicScenario::new(name, check)))
    };
    match name.trim().to_lowercase().as_str() {
        "smoke" => Some(Box::new(smoke::SmokeScenario)),
        "public-profile" | "public" => Some(Box::new(public_profile::PublicProfileScenario)),
        "password-sign-in" => logic("Password Sign-In", flows::password_sign_in),
        "onboarding" => logic("Onboarding Completion", flows::onboarding_completion),
        "late-profile-response" => logic("Late Profile Response", flows::late_profile_response),
        "sign-out-idempotent" => logic("Sign-Out Idempotence", flows::sign_out_idempotent),
        "sign-up-confirmation" => logic("Sign-Up Confirmation", flows::sign_up_confirmation),
        "rejected-credentials" => logic("Rejected Credentials", flows::rejected_credentials),
        "offline-sign-in" => logic("Offline Sign-In", flows::offline_sign_in),
        "degraded-profile" => logic("Degraded Profile Fetch", flows::degraded_profile),
        "google-oauth" | "google" => logic("Google OAuth", flows::google_oauth),
        "session-restore" => logic("Session Restore", flows::session_restore),
        "event-storm" | "fuzz" => logic("Event Storm", flows::event_storm),
        _ => None,
    }
}
