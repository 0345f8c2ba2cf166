//! Backend API Client
//!
//! `fetch` bindings to the REST backend, organized by domain. Every call
//! resolves to `ApiResult`; callers decide whether a failure becomes an
//! empty list, an inline banner or a chat message.

mod bidding;
mod company;
mod favorites;
mod market;
mod partner;
mod query;

use cnpj_insight_core::error::{ApiError, ApiResult};
use cnpj_insight_core::models::{
    BiddingResponse, CompanyProfile, NlQuery, NlQueryResult, PartnerMatch, SectorAnalysis, SectorQuery,
};
use cnpj_insight_core::{AppConfig, RegistryApi};
use gloo_timers::callback::Timeout;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

pub use company::CompanyListing;

/// Everything `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// `?a=1&b=2`, keeping empty values so the backend sees every key
pub fn query_string(params: &[(&str, &str)]) -> String {
    let pairs: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, encode(v))).collect();
    format!("?{}", pairs.join("&"))
}

// ========================
// Response bodies
// ========================

/// A successful body: parsed when the backend said JSON, raw text otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    fn from_text(content_type: &str, text: String) -> Self {
        if content_type.contains("application/json") {
            match serde_json::from_str(&text) {
                Ok(v) => return Body::Json(v),
                Err(e) => debug!(error = %e, "JSON content type with an unparseable body"),
            }
        }
        Body::Text(text)
    }

    /// Text bodies are parsed on demand
    pub fn into_json(self) -> ApiResult<Value> {
        match self {
            Body::Json(v) => Ok(v),
            Body::Text(t) => Ok(serde_json::from_str(&t)?),
        }
    }
}

fn js_error(e: JsValue) -> ApiError {
    let name = js_sys::Reflect::get(&e, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string());
    if name.as_deref() == Some("AbortError") {
        return ApiError::Aborted;
    }
    ApiError::Network(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

// ========================
// Client
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    config: AppConfig,
}

impl ApiClient {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    async fn send(&self, method: &str, path: &str, body: Option<String>) -> ApiResult<Body> {
        let url = self.config.endpoint(path);
        debug!(method, url = %url, "request");

        let headers = Headers::new().map_err(js_error)?;
        headers.set("Accept", "application/json").map_err(js_error)?;

        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = body {
            headers.set("Content-Type", "application/json").map_err(js_error)?;
            init.set_body(&JsValue::from_str(&body));
        }
        init.set_headers(&headers);

        // dropping the timer cancels it, so it only fires on a hung request
        let controller = AbortController::new().map_err(js_error)?;
        init.set_signal(Some(&controller.signal()));
        let _timer = (self.config.request_timeout_ms > 0).then(|| {
            let controller = controller.clone();
            Timeout::new(self.config.request_timeout_ms, move || controller.abort())
        });

        let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
        let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        if !response.ok() {
            warn!(status = response.status(), url = %url, "backend returned an error status");
            return Err(ApiError::Status(response.status()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .ok()
            .flatten()
            .unwrap_or_default();
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();
        Ok(Body::from_text(&content_type, text))
    }

    pub async fn get_json(&self, path: &str) -> ApiResult<Value> {
        self.send("GET", path, None).await?.into_json()
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Body> {
        let body = serde_json::to_string(body)?;
        self.send("POST", path, Some(body)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.post(path, body).await?.into_json()
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send("DELETE", path, None).await.map(|_| ())
    }
}

// ========================
// Chat backend
// ========================

impl RegistryApi for ApiClient {
    async fn bidding_by_cnpj(&self, cnpj: &str) -> ApiResult<BiddingResponse> {
        self.bidding_for_cnpj(cnpj).await
    }

    async fn company_profile(&self, cnpj: &str) -> ApiResult<CompanyProfile> {
        self.profile_by_cnpj(cnpj).await
    }

    async fn sector_analysis(&self, query: &SectorQuery) -> ApiResult<SectorAnalysis> {
        self.analyze_sector(query).await
    }

    async fn partner_search(&self, name: &str) -> ApiResult<Vec<PartnerMatch>> {
        self.search_partners(name).await
    }

    async fn natural_language_query(&self, query: &NlQuery) -> ApiResult<NlQueryResult> {
        self.run_nl_query(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_matches_uri_component() {
        assert_eq!(encode("João & Maria"), "Jo%C3%A3o%20%26%20Maria");
        assert_eq!(encode("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn test_query_string_keeps_empty_values() {
        assert_eq!(query_string(&[("cnae", "6204"), ("uf", "")]), "?cnae=6204&uf=");
    }

    #[test]
    fn test_body_normalization() {
        assert_eq!(
            Body::from_text("application/json; charset=utf-8", r#"{"a":1}"#.into()),
            Body::Json(json!({"a": 1}))
        );
        let text = Body::from_text("text/html", r#"{"a":1}"#.into());
        assert_eq!(text.into_json().unwrap(), json!({"a": 1}));
        assert!(matches!(
            Body::from_text("text/plain", "oops".into()).into_json(),
            Err(ApiError::Decode(_))
        ));
    }
}
