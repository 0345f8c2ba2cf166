//! Browser Helpers
//!
//! Clock, clipboard, downloads and the page URL.

use chrono::NaiveDate;
use cnpj_insight_core::models::SavedFilters;
use percent_encoding::percent_decode_str;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Local calendar date
pub fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}

pub fn now_rfc3339() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

// ========================
// Clipboard
// ========================

pub async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let promise = window.navigator().clipboard().write_text(text);
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| format!("clipboard write failed: {:?}", e))
}

// ========================
// Downloads
// ========================

/// Save `contents` as a JSON file through a temporary object URL
pub fn download_json(filename: &str, contents: &str) -> Result<(), String> {
    let js_err = |e: JsValue| format!("{:?}", e);
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let bag = web_sys::BlobPropertyBag::new();
    bag.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &bag).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "anchor cast failed".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(js_err)
}

// ========================
// Location
// ========================

/// Page URL without its query, plus `query`
pub fn page_url_with(query: &str) -> Option<String> {
    let location = web_sys::window()?.location();
    let origin = location.origin().ok()?;
    let path = location.pathname().ok()?;
    Some(format!("{}{}{}", origin, path, query))
}

/// `cnae`/`uf` from a shared link, if the page was opened with one
pub fn shared_filters() -> Option<SavedFilters> {
    let search = web_sys::window()?.location().search().ok()?;
    let filters = parse_filter_query(&search);
    (!filters.is_empty()).then_some(filters)
}

fn parse_filter_query(search: &str) -> SavedFilters {
    let mut cnae = String::new();
    let mut uf = String::new();
    for pair in search.trim_start_matches('?').split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = percent_decode_str(&value.replace('+', " ")).decode_utf8_lossy().into_owned();
        match key {
            "cnae" => cnae = value,
            "uf" => uf = value,
            _ => {}
        }
    }
    SavedFilters::normalized(&cnae, &uf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_query() {
        let f = parse_filter_query("?cnae=6204-0%2F00&uf=sp&x=1");
        assert_eq!(f.cnae, "6204000");
        assert_eq!(f.uf, "SP");
        assert!(parse_filter_query("").is_empty());
        assert!(parse_filter_query("?cnae=&uf=").is_empty());
    }
}
