use anyhow::{Context, Result, ensure};
use lingostreak_core::memory::DEMO_PUBLIC_USERNAME;
use thirtyfour::prelude::*;

use super::session_flows::public_profile_signed_out;
use super::{BrowserScenario, CombinedScenario, ScenarioCtx, TestScenario};
use crate::common::page_url;

/// `/profile/:username` renders without a session.
pub struct PublicProfileScenario;

#[async_trait::async_trait]
impl BrowserScenario for PublicProfileScenario {
    async fn run_browser(&self, driver: &WebDriver, ctx: &ScenarioCtx) -> Result<()> {
        let path = format!("/profile/{DEMO_PUBLIC_USERNAME}");
        driver.goto(page_url(&ctx.base_url, &path)).await?;

        driver
            .find(By::Css("[data-screen='public-profile']"))
            .await
            .context("public profile screen never rendered")?;
        let outcome = driver
            .find(By::Css("#public-profile-name, #public-profile-missing"))
            .await
            .context("profile lookup never settled")?;
        let text = outcome.text().await?;
        ensure!(!text.trim().is_empty(), "profile card is empty");
        ensure!(
            driver.find_all(By::Id("auth-email")).await?.is_empty(),
            "auth form shown on a public page"
        );
        if ctx.verbose {
            println!("  🌐 Public profile card: {}", text.trim());
        }
        Ok(())
    }
}

impl CombinedScenario for PublicProfileScenario {
    fn as_logic_scenario(&self) -> Option<TestScenario> {
        Some(TestScenario::new("Public Profile", public_profile_signed_out))
    }
}
