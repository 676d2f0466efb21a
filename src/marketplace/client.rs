// src/marketplace/client.rs

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL '{0}' cannot carry path segments")]
    CannotBeABase(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Response payload: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }

    /// JSON pretty-printed; text passed through unchanged.
    pub fn render(&self) -> String {
        match self {
            ResponseBody::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
            ResponseBody::Text(t) => t.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Thin HTTP client bound to the marketplace base URL.
#[derive(Clone, Debug)]
pub struct MarketplaceClient {
    http: Client,
    base: Url,
}

impl MarketplaceClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base = Url::parse(&config.api_url).map_err(|source| ApiError::BaseUrl {
            url: config.api_url.clone(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::CannotBeABase(config.api_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .user_agent(concat!("meatmarket-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { http, base })
    }

    /// Base URL plus percent-encoded path segments.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Endpoint with form-urlencoded query pairs, in the given order.
    pub fn endpoint_with_query(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.endpoint(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    /// Issues one request. Non-JSON responses come back as text; only transport
    /// failures are errors.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        api_key: Option<&str>,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        debug!("{} {}", method, url);
        let target = url.to_string();
        let mut req = self.http.request(method, url);
        if let Some(key) = api_key {
            req = req.header(API_KEY_HEADER, key);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| ApiError::Transport {
            url: target.clone(),
            source,
        })?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|source| ApiError::Transport { url: target, source })?;

        Ok(ApiResponse {
            status,
            body: ResponseBody::from_text(text),
        })
    }
}
