#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod backend;
pub mod components;
pub mod config;
pub mod dom;
pub mod pages;
pub mod router;
pub mod theme;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("logger already initialised"));
    }
    // Paint the saved theme before the first frame, unless this is a public
    // profile page which keeps the document defaults.
    if lingostreak_core::gate::theme_applies(&dom::current_path()) {
        theme::apply_theme(theme::load_theme());
    }
    yew::Renderer::<app::App>::new().render();
}
