use anyhow::{Context, Result};
use chrono::Utc;
use std::{fs, path::Path};
use thirtyfour::prelude::*;

/// Reads the marker of the screen currently mounted by the app.
const SCREEN_MARKER_JS: &str = "var el = document.querySelector('[data-screen]'); \
     return el ? { screen: el.getAttribute('data-screen'), route: el.getAttribute('data-route') } : null;";

pub fn artifacts_dir(base: &str, browser: &str, scenario: &str, seed: u64) -> String {
    let ts = Utc::now().format("%Y%m%dT%H%M%S");
    format!("{base}/{browser}/{scenario}/seed-{seed}/{ts}")
}

pub async fn capture_artifacts(driver: &WebDriver, dir: &str, err: &anyhow::Error) -> Result<()> {
    let screenshot = driver.screenshot_as_png().await.ok();
    let source = driver.source().await.ok();
    let screen = driver
        .execute(SCREEN_MARKER_JS, vec![])
        .await
        .ok()
        .map(|ret| ret.json().clone());
    let chain = format!("{err:#}");

    write_artifact_files(
        Path::new(dir),
        screenshot.as_deref(),
        source.as_deref(),
        screen.as_ref(),
        &chain,
    )
}

fn write_artifact_files(
    dir: &Path,
    screenshot: Option<&[u8]>,
    source: Option<&str>,
    screen: Option<&serde_json::Value>,
    error_chain: &str,
) -> Result<()> {
    fs::create_dir_all(dir).context("creating artifacts dir")?;

    if let Some(png) = screenshot {
        let _ = fs::write(dir.join("screenshot.png"), png);
    }

    if let Some(src) = source {
        let _ = fs::write(dir.join("dom.html"), src);
    }

    if let Some(screen_json) = screen {
        let payload = serde_json::to_vec_pretty(screen_json).unwrap_or_default();
        let _ = fs::write(dir.join("screen.json"), payload);
    }

    let _ = fs::write(dir.join("error.txt"), error_chain);

    Ok(())
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Join an app path onto the base URL, keeping any query string on the base.
pub fn page_url(base_url: &str, path: &str) -> String {
    let (root, query) = base_url
        .split_once('?')
        .map_or((base_url, None), |(root, query)| (root, Some(query)));
    let mut url = format!(
        "{}/{}",
        root.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" smoke, ,public-profile,  event-storm ");
        assert_eq!(parts, vec!["smoke", "public-profile", "event-storm"]);
    }

    #[test]
    fn artifacts_dir_includes_key_segments() {
        let dir = artifacts_dir("target/out", "chrome", "smoke", 42);
        assert!(dir.contains("target/out/chrome/smoke/seed-42/"));
    }

    #[test]
    fn page_url_joins_paths() {
        assert_eq!(
            page_url("http://localhost:8080/", "/profile/alice"),
            "http://localhost:8080/profile/alice"
        );
        assert_eq!(
            page_url("http://localhost:8080/app?demo=1", "dashboard"),
            "http://localhost:8080/app/dashboard?demo=1"
        );
        assert_eq!(page_url("http://localhost:8080", "/"), "http://localhost:8080/");
    }

    #[test]
    fn write_artifact_files_writes_expected_payloads() {
        let base = std::env::temp_dir().join(format!(
            "lingostreak-artifacts-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let screen = json!({ "screen": "auth", "route": null });
        write_artifact_files(
            &base,
            Some(&[1, 2, 3]),
            Some("<html />"),
            Some(&screen),
            "boom",
        )
        .expect("write artifacts");

        assert!(base.join("screenshot.png").exists());
        assert!(base.join("dom.html").exists());
        assert!(base.join("screen.json").exists());
        assert_eq!(
            std::fs::read_to_string(base.join("error.txt")).unwrap(),
            "boom"
        );
    }
}
