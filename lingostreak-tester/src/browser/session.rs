use std::time::Duration;
use thirtyfour::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BrowserKind {
    Chrome,
    Edge,
    Firefox,
    Safari,
}

impl BrowserKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "chrome" => Some(Self::Chrome),
            "edge" => Some(Self::Edge),
            "firefox" => Some(Self::Firefox),
            "safari" => Some(Self::Safari),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
        }
    }

    /// Where the matching local driver listens by default.
    const fn default_driver_url(self) -> &'static str {
        match self {
            Self::Chrome => "http://localhost:9515",
            Self::Edge => "http://localhost:17556",
            Self::Firefox => "http://localhost:4444",
            Self::Safari => "http://localhost:4445",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub implicit_wait_secs: u64,
    pub remote_hub: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            implicit_wait_secs: 3,
            remote_hub: None,
        }
    }
}

impl BrowserConfig {
    fn driver_url(&self, kind: BrowserKind) -> &str {
        self.remote_hub
            .as_deref()
            .unwrap_or_else(|| kind.default_driver_url())
    }
}

pub async fn new_session(kind: BrowserKind, cfg: &BrowserConfig) -> WebDriverResult<WebDriver> {
    let url = cfg.driver_url(kind);
    let driver = match kind {
        BrowserKind::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            if cfg.headless {
                caps.set_headless()?;
            }
            WebDriver::new(url, caps).await?
        }
        BrowserKind::Edge => {
            let mut caps = DesiredCapabilities::edge();
            if cfg.headless {
                caps.set_headless()?;
            }
            WebDriver::new(url, caps).await?
        }
        BrowserKind::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            if cfg.headless {
                caps.set_headless()?;
            }
            WebDriver::new(url, caps).await?
        }
        // safaridriver has no headless mode.
        BrowserKind::Safari => WebDriver::new(url, DesiredCapabilities::safari()).await?,
    };

    driver
        .set_implicit_wait_timeout(Duration::from_secs(cfg.implicit_wait_secs))
        .await?;
    Ok(driver)
}
