//! REST client for the member-listing backend.
//!
//! `GET {base}/members?{query}` returns a JSON array of members,
//! `GET {base}/members/count?{filter}` returns the total as a JSON number.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use shared::{ApiError, MemberFilter, MemberListQuery, MemberRecord};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Debug, Clone)]
pub struct MemberApi {
    base_url: String,
}

impl MemberApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn members_url(&self, query: &MemberListQuery) -> String {
        with_query(format!("{}/members", self.base_url), &query.to_query_string())
    }

    pub fn count_url(&self, filter: &MemberFilter) -> String {
        with_query(format!("{}/members/count", self.base_url), &filter.to_query_string())
    }

    pub async fn list_members(&self, query: &MemberListQuery) -> Result<Vec<MemberRecord>, ApiError> {
        let value = fetch(&self.members_url(query), Body::Json).await?;
        decode(value)
    }

    pub async fn count_members(&self, filter: &MemberFilter) -> Result<u64, ApiError> {
        let value = fetch(&self.count_url(filter), Body::Json).await?;
        decode::<CountBody>(value)?.into_count()
    }
}

fn with_query(path: String, query: &str) -> String {
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// Older backends wrap the number as `{"count": n}`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
enum CountBody {
    Bare(f64),
    Wrapped { count: f64 },
}

impl CountBody {
    fn into_count(self) -> Result<u64, ApiError> {
        let (CountBody::Bare(count) | CountBody::Wrapped { count }) = self;
        if !count.is_finite() || count < 0.0 {
            return Err(ApiError::Decode(format!("invalid member count {count}")));
        }
        Ok(count.floor() as u64)
    }
}

enum Body {
    Json,
    Text,
}

/// Fetch a UTF-8 text resource, e.g. the directory config.
pub async fn fetch_text(url: &str) -> Result<String, ApiError> {
    let value = fetch(url, Body::Text).await?;
    value
        .as_string()
        .ok_or_else(|| ApiError::Decode(format!("{url} did not return text")))
}

async fn fetch(url: &str, body: Body) -> Result<JsValue, ApiError> {
    let window = web_sys::window().ok_or_else(|| ApiError::Transport("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|error| ApiError::Transport(js_error_message(&error)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| ApiError::Transport(format!("{url} did not return a response")))?;

    if !response.ok() {
        return Err(ApiError::Status {
            status: response.status(),
            url: url.to_string(),
        });
    }

    let body = match body {
        Body::Json => response.json(),
        Body::Text => response.text(),
    }
    .map_err(|error| ApiError::Decode(js_error_message(&error)))?;
    JsFuture::from(body)
        .await
        .map_err(|error| ApiError::Decode(js_error_message(&error)))
}

fn decode<T: DeserializeOwned>(value: JsValue) -> Result<T, ApiError> {
    serde_wasm_bindgen::from_value(value).map_err(|error| ApiError::Decode(error.to_string()))
}

pub fn js_error_message(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{error:?}"))
}
