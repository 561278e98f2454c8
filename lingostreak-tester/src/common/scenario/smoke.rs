use anyhow::{Context, Result, ensure};
use thirtyfour::prelude::*;

use super::session_flows::no_persisted_session;
use super::{BrowserScenario, CombinedScenario, ScenarioCtx, TestScenario};
use crate::common::page_url;

/// Fresh visit: the app boots past the loading screen to sign-in.
pub struct SmokeScenario;

#[async_trait::async_trait]
impl BrowserScenario for SmokeScenario {
    async fn run_browser(&self, driver: &WebDriver, ctx: &ScenarioCtx) -> Result<()> {
        driver.goto(page_url(&ctx.base_url, "/dashboard")).await?;

        driver
            .find(By::Css("[data-screen='auth']"))
            .await
            .context("auth screen never rendered")?;
        driver.find(By::Id("auth-email")).await?;
        driver.find(By::Id("auth-password")).await?;
        driver.find(By::Id("auth-google")).await?;
        if ctx.verbose {
            println!("  🌐 Auth screen rendered (seed {})", ctx.seed);
        }

        driver.find(By::Id("auth-switch")).await?.click().await?;
        let mode = driver
            .find(By::Css("[data-screen='auth'] form"))
            .await?
            .attr("data-mode")
            .await?;
        ensure!(
            mode.as_deref() == Some("sign-up"),
            "mode switch left form in {mode:?}"
        );
        if ctx.verbose {
            println!("  🖱️  Switched to sign-up mode");
        }
        Ok(())
    }
}

impl CombinedScenario for SmokeScenario {
    fn as_logic_scenario(&self) -> Option<TestScenario> {
        Some(TestScenario::new("Smoke", no_persisted_session))
    }
}
