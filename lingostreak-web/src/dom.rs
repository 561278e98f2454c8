use thiserror::Error;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Storage, Window};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("localStorage unavailable")]
    StorageUnavailable,
    #[error("browser API failed: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_error_message(&value))
    }
}

/// Retrieve the global `window` object.
///
/// # Panics
/// Panics if executed outside of a browser context where `window` is unavailable.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Retrieve the document object for DOM interactions.
///
/// # Panics
/// Panics when the document cannot be accessed from the current browser window.
#[must_use]
pub fn document() -> Document {
    window()
        .document()
        .expect("`document` should exist in browser context")
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if `localStorage` is unavailable (private mode, sandboxed frames).
pub fn local_storage() -> Result<Storage, DomError> {
    window()
        .local_storage()?
        .ok_or(DomError::StorageUnavailable)
}

#[must_use]
pub fn storage_get(key: &str) -> Option<String> {
    local_storage()
        .ok()
        .and_then(|storage| storage.get_item(key).ok().flatten())
}

pub fn storage_set(key: &str, value: &str) {
    let result = local_storage().and_then(|storage| Ok(storage.set_item(key, value)?));
    if let Err(err) = result {
        log::warn!("could not persist {key}: {err}");
    }
}

pub fn storage_remove(key: &str) {
    let result = local_storage().and_then(|storage| Ok(storage.remove_item(key)?));
    if let Err(err) = result {
        log::warn!("could not remove {key}: {err}");
    }
}

/// Full location of the current page.
#[must_use]
pub fn current_url() -> Option<Url> {
    let href = window().location().href().ok()?;
    Url::parse(&href).ok()
}

/// Router-relative path of the current page.
#[must_use]
pub fn current_path() -> String {
    let path = window()
        .location()
        .pathname()
        .unwrap_or_else(|_| String::from("/"));
    crate::config::app_path(&path)
}

/// Rewrite the address bar without navigating or adding a history entry.
///
/// # Errors
/// Returns the browser error if the history API rejects the URL.
pub fn replace_url(url: &Url) -> Result<(), DomError> {
    let relative = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };
    let relative = match url.fragment() {
        Some(fragment) => format!("{relative}#{fragment}"),
        None => relative,
    };
    window()
        .history()?
        .replace_state_with_url(&JsValue::NULL, "", Some(&relative))?;
    Ok(())
}

/// Leave the app for `url` (OAuth consent screen).
///
/// # Errors
/// Returns the browser error if navigation is refused.
pub fn assign_location(url: &Url) -> Result<(), DomError> {
    window().location().assign(url.as_str())?;
    Ok(())
}

/// Unix seconds from the browser clock.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn now_secs() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}
