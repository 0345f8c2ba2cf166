//! Runtime Configuration
//!
//! Reads an optional `window.__CNPJ_INSIGHT_CONFIG__` object; anything it
//! leaves out comes from the defaults for the page's protocol.

use cnpj_insight_core::AppConfig;
use wasm_bindgen::JsValue;

const CONFIG_GLOBAL: &str = "__CNPJ_INSIGHT_CONFIG__";

pub fn load() -> AppConfig {
    let Some(window) = web_sys::window() else {
        return AppConfig::default();
    };
    let protocol = window.location().protocol().unwrap_or_default();
    let derived = AppConfig::for_protocol(&protocol);

    let raw = match js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)) {
        Ok(v) if !v.is_undefined() && !v.is_null() => v,
        _ => return derived,
    };

    match serde_wasm_bindgen::from_value::<AppConfig>(raw) {
        Ok(mut cfg) => {
            if cfg.api_base.is_empty() {
                cfg.api_base = derived.api_base;
            }
            cfg
        }
        Err(e) => {
            // the subscriber is not up yet
            web_sys::console::warn_1(&format!("[CONFIG] ignoring {}: {}", CONFIG_GLOBAL, e).into());
            derived
        }
    }
}
