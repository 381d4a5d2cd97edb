//! Shared blocking HTTP transport for the marketplace API.
//!
//! Every request carries the JSON/XHR headers the backend expects, plus the
//! optional bearer and CSRF tokens configured on the builder. Non-success
//! responses are turned into [`CartError::Remote`] with the best message the
//! body offers.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CartError, Result};

/// Blocking JSON client bound to one API base URL.
///
/// The HTTP client is created on first request, so a guest session that never
/// talks to the API never opens one. Cloning is cheap and clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    headers: HeaderMap,
    client: Arc<OnceLock<Client>>,
}

impl ApiClient {
    /// Build a client for `base_url` with the given timeout and tokens.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        bearer_token: Option<&str>,
        csrf_token: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        if let Some(token) = bearer_token {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        }
        if let Some(token) = csrf_token {
            headers.insert(HeaderName::from_static("x-csrf-token"), header_value(token)?);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            headers,
            client: Arc::new(OnceLock::new()),
        })
    }

    /// Lazy HTTP client, created on first use.
    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = Client::builder()
            .timeout(self.timeout)
            .default_headers(self.headers.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(self.client.get_or_init(|| built))
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        tracing::debug!(%method, path, "marketplace request");
        Ok(self.client()?.request(method, self.url(path)))
    }

    /// `GET path` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = check(self.request(Method::GET, path)?.send()?)?;
        Ok(resp.json()?)
    }

    /// Send `body` as JSON with `method`, discarding the response body.
    pub fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        check(self.request(method, path)?.json(body).send()?)?;
        Ok(())
    }

    /// Send a bodyless request with `method`, discarding the response body.
    pub fn send(&self, method: Method, path: &str) -> Result<()> {
        check(self.request(method, path)?.send()?)?;
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| CartError::InvalidArgument(format!("Invalid header value: {}", e)))
}

/// Pass success responses through; turn anything else into `Remote`.
fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let message = resp
        .text()
        .ok()
        .and_then(|body| remote_message(&body))
        .unwrap_or(fallback);

    tracing::debug!(status = status.as_u16(), %message, "marketplace request failed");
    Err(CartError::Remote {
        status: status.as_u16(),
        message,
    })
}

/// Pull a human-readable message out of an error body, if it has one.
fn remote_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
