use crate::constants::{media, sodium};
use crate::errors::{ApiError, ToolError};
use crate::services::logger::Logger;
use crate::services::sodium::{QueryParams, SodiumConfig};
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use std::time::Instant;
use url::Url;

/// HTTP transport for one tenant of the Sodium API.
///
/// Immutable after construction, so a single instance is shared by every
/// tool call without locking.
#[derive(Clone)]
pub struct SodiumClient {
    logger: Logger,
    http: reqwest::Client,
    config: SodiumConfig,
}

impl SodiumClient {
    pub fn new(config: SodiumConfig, logger: &Logger) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .user_agent(sodium::USER_AGENT)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("client"),
            http,
            config,
        })
    }

    pub fn tenant(&self) -> &str {
        &self.config.tenant
    }

    /// Prefixes `segments` with the tenant scope: `/tenants/{tenant}/...`.
    pub fn tenant_path<'a>(&'a self, segments: &[&'a str]) -> Vec<&'a str> {
        let mut path = Vec::with_capacity(segments.len() + 2);
        path.push(sodium::TENANTS_SEGMENT);
        path.push(self.config.tenant.as_str());
        path.extend_from_slice(segments);
        path
    }

    /// Each segment is percent-encoded on its own, so codes containing `/`
    /// or `?` stay inside their segment.
    pub fn build_url(
        &self,
        segments: &[&str],
        query: Option<&QueryParams>,
    ) -> Result<Url, ApiError> {
        let mut url = self.config.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Transport("Base URL cannot carry a path".to_string()))?;
            path.clear();
            path.extend(segments);
        }
        if let Some(query) = query {
            query.apply(&mut url);
        }
        Ok(url)
    }

    fn base_headers(&self, accept: &'static str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|_| ApiError::Transport("API key is not a valid header value".to_string()))?;
        headers.insert(sodium::API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        Ok(headers)
    }

    /// Performs one JSON round trip.
    ///
    /// Only POST and PUT carry a body and a JSON content type. A 204 yields an
    /// empty object without touching the body.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&QueryParams>,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(segments, query)?;
        let mut headers = self.base_headers(media::JSON)?;
        let sends_body = method == Method::POST || method == Method::PUT;
        if sends_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(media::JSON));
        }

        let started = Instant::now();
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers);
        if let (true, Some(body)) = (sends_body, body) {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        self.log_exchange(&method, &url, status, started);

        let response = ensure_success(response).await?;
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Default::default()));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Downloads a PDF and returns it base64-encoded. Never sends a body.
    pub async fn binary_request(
        &self,
        segments: &[&str],
        query: Option<&QueryParams>,
    ) -> Result<String, ApiError> {
        let url = self.build_url(segments, query)?;
        let headers = self.base_headers(media::PDF)?;

        let started = Instant::now();
        let response = self
            .http
            .get(url.clone())
            .headers(headers)
            .send()
            .await?;
        let status = response.status();
        self.log_exchange(&Method::GET, &url, status, started);

        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }

    /// Fetches one page and returns only its records.
    pub async fn request_list(
        &self,
        segments: &[&str],
        query: Option<&QueryParams>,
    ) -> Result<Vec<Value>, ApiError> {
        let page = self.request(Method::GET, segments, query, None).await?;
        Ok(unwrap_page(page))
    }

    fn log_exchange(&self, method: &Method, url: &Url, status: StatusCode, started: Instant) {
        self.logger.debug(
            "request",
            Some(&serde_json::json!({
                "method": method.as_str(),
                "path": url.path(),
                "status": status.as_u16(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
    }
}

/// Turns a non-2xx response into `ApiError::Status`, reading the body for a
/// `message`. Shared by the JSON and binary paths.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let bytes = response.bytes().await.unwrap_or_default();
    Err(ApiError::from_response(
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        &bytes,
    ))
}

/// Drops the paging envelope. A bare array is accepted as-is and a body
/// without `data` reads as an empty page.
pub fn unwrap_page(page: Value) -> Vec<Value> {
    match page {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
