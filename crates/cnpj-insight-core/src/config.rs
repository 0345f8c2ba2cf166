//! Dashboard Configuration
//!
//! Every field has a default so a partial (or absent) config object is valid.

use serde::{Deserialize, Serialize};

/// Backend used when the bundle is opened straight from disk
pub const LOCAL_BACKEND: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for every `/api/...` path; empty means same origin
    pub api_base: String,
    /// Abort-after-duration for calls that opt into a timeout
    pub request_timeout_ms: u32,
    /// Debounce for keystroke-driven list searches
    pub search_debounce_ms: u32,
    /// Debounce for CNAE suggestions
    pub suggest_debounce_ms: u32,
    pub companies_page_size: usize,
    pub opportunities_page_size: usize,
    /// Max players requested from the sector analysis
    pub players_limit: u32,
    /// `trace` | `debug` | `info` | `warn` | `error`
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            request_timeout_ms: 20_000,
            search_debounce_ms: 300,
            suggest_debounce_ms: 200,
            companies_page_size: 9,
            opportunities_page_size: 9,
            players_limit: 12,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, with the backend base derived from `location.protocol`
    pub fn for_protocol(protocol: &str) -> Self {
        let api_base = if protocol == "file:" {
            LOCAL_BACKEND.to_string()
        } else {
            String::new()
        };
        Self {
            api_base,
            ..Self::default()
        }
    }

    /// Join the base and an absolute `/api/...` path
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}
