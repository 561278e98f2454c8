//! Theme application to the document root and the browser chrome.
use lingostreak_core::ThemeMode;
#[cfg(target_arch = "wasm32")]
use lingostreak_core::theme::THEME_STORAGE_KEY;

/// Class toggled on `<html>` for dark mode.
pub const DARK_CLASS: &str = "dark";

/// Theme stored by a previous visit, or the default.
#[must_use]
pub fn parse_stored(value: Option<&str>) -> ThemeMode {
    value
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
#[must_use]
pub fn load_theme() -> ThemeMode {
    parse_stored(crate::dom::storage_get(THEME_STORAGE_KEY).as_deref())
}

#[cfg(target_arch = "wasm32")]
pub fn persist_theme(theme: ThemeMode) {
    crate::dom::storage_set(THEME_STORAGE_KEY, theme.as_str());
}

/// Set the `dark` class and `data-theme` on `<html>` and update
/// `meta[name=theme-color]`.
#[cfg(target_arch = "wasm32")]
pub fn apply_theme(theme: ThemeMode) {
    let document = crate::dom::document();
    if let Some(root) = document.document_element() {
        let classes = root.class_list();
        let _ = if theme.is_dark() {
            classes.add_1(DARK_CLASS)
        } else {
            classes.remove_1(DARK_CLASS)
        };
        let _ = root.set_attribute("data-theme", theme.as_str());
    }
    match document.query_selector("meta[name='theme-color']") {
        Ok(Some(meta)) => {
            let _ = meta.set_attribute("content", theme.chrome_color());
        }
        Ok(None) => log::debug!("no theme-color meta tag"),
        Err(err) => log::warn!(
            "theme-color lookup failed: {}",
            crate::dom::js_error_message(&err)
        ),
    }
}
