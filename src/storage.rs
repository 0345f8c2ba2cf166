//! Browser Storage
//!
//! Typed access to the `localStorage` keys the dashboard owns. Values are
//! JSON; a missing, unreadable or malformed entry reads as `None`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Set by the login page; only read here
pub const AUTH_KEY: &str = "pickles_auth";
pub const RECENT_SEARCHES_KEY: &str = "recent_searches";
pub const SAVED_FILTERS_KEY: &str = "saved_filters";
pub const SIDEBAR_PINNED_KEY: &str = "sidebar_pinned";
pub const FAVORITES_KEY: &str = "b2g_favoritos";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = local_storage()?.get_item(key).ok().flatten()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed storage entry");
            None
        }
    }
}

pub fn save<T: Serialize>(key: &str, value: &T) {
    let Some(storage) = local_storage() else {
        return;
    };
    match serde_json::to_string(value) {
        Ok(raw) => {
            if storage.set_item(key, &raw).is_err() {
                warn!(key, "storage write rejected");
            }
        }
        Err(e) => warn!(key, error = %e, "could not serialize storage entry"),
    }
}

pub fn remove(key: &str) {
    if let Some(storage) = local_storage() {
        if storage.remove_item(key).is_err() {
            warn!(key, "storage delete rejected");
        }
    }
}

/// The login page stores the literal `true`
pub fn is_authenticated() -> bool {
    local_storage()
        .and_then(|s| s.get_item(AUTH_KEY).ok().flatten())
        .is_some_and(|v| v == "true")
}
