use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::AlphaError;

/// Substring the provider puts in a 200 response when it rejected the call.
pub const INVALID_CALL_MARKER: &str = "Invalid API call.";

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// GET request handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub timeout_ms: u64,
    /// Route through the configured proxies instead of a direct connection.
    pub use_proxy: bool,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_proxy: false,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }
}

/// Response as received from the provider, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    /// Originating URL, for diagnostics.
    pub url: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            url: url.into(),
        }
    }

    pub fn ok(body: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(200, body, url)
    }

    pub const fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn has_invalid_call_marker(&self) -> bool {
        self.body.contains(INVALID_CALL_MARKER)
    }

    /// 200 and not flagged by the provider as an invalid call.
    pub fn is_valid(&self) -> bool {
        self.is_success() && !self.has_invalid_call_marker()
    }
}

/// Replaces the `apikey` query value so URLs can be logged.
pub fn redact_api_key(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_owned();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name.eq_ignore_ascii_case("apikey") => format!("{name}=<redacted>"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract used by the fetcher.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, HttpError>> + Send + 'a>>;
}

/// Production transport using reqwest, with an optional proxied client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    direct: Arc<reqwest::Client>,
    proxied: Option<Arc<reqwest::Client>>,
}

impl ReqwestHttpClient {
    /// Builds the direct client and, when `proxies` is non-empty, a second
    /// client routed through them. Keys are `http`, `https` or `all`.
    pub fn new(proxies: &BTreeMap<String, String>) -> Result<Self, AlphaError> {
        let direct = base_builder()
            .build()
            .map_err(|e| AlphaError::configuration(format!("failed to build http client: {e}")))?;

        let proxied = if proxies.is_empty() {
            None
        } else {
            let mut builder = base_builder();
            for (scheme, url) in proxies {
                builder = builder.proxy(proxy_for(scheme, url)?);
            }
            let client = builder.build().map_err(|e| {
                AlphaError::configuration(format!("failed to build proxied http client: {e}"))
            })?;
            Some(Arc::new(client))
        };

        Ok(Self {
            direct: Arc::new(direct),
            proxied,
        })
    }

    pub fn has_proxy(&self) -> bool {
        self.proxied.is_some()
    }
}

fn base_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder().user_agent(concat!("alphaframe/", env!("CARGO_PKG_VERSION")))
}

fn proxy_for(scheme: &str, url: &str) -> Result<reqwest::Proxy, AlphaError> {
    let proxy = match scheme.to_ascii_lowercase().as_str() {
        "http" => reqwest::Proxy::http(url),
        "https" => reqwest::Proxy::https(url),
        "all" => reqwest::Proxy::all(url),
        other => {
            return Err(AlphaError::configuration(format!(
                "unsupported proxy scheme '{other}', expected http, https or all"
            )))
        }
    };
    proxy.map_err(|e| AlphaError::configuration(format!("invalid proxy url for '{scheme}': {e}")))
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let client = if request.use_proxy {
                self.proxied.as_ref().ok_or_else(|| {
                    HttpError::non_retryable("proxy requested but no proxies are configured")
                })?
            } else {
                &self.direct
            };

            let response = client
                .get(&request.url)
                .timeout(Duration::from_millis(request.timeout_ms))
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        HttpError::new(format!("request timeout: {}", e.without_url()))
                    } else if e.is_connect() {
                        HttpError::new(format!("connection failed: {}", e.without_url()))
                    } else if e.is_builder() {
                        HttpError::non_retryable(format!("invalid request: {}", e.without_url()))
                    } else {
                        HttpError::new(format!("request failed: {}", e.without_url()))
                    }
                })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| {
                    HttpError::new(format!("failed to read response body: {}", e.without_url()))
                })?;

            Ok(RawResponse::new(status, body, request.url))
        })
    }
}

type Responder = dyn Fn(&HttpRequest) -> Result<RawResponse, HttpError> + Send + Sync;

/// Scripted transport for deterministic offline tests. Records every request.
pub struct MockHttpClient {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<RawResponse, HttpError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with the same status and body.
    pub fn always(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |request| Ok(RawResponse::new(status, body.clone(), request.url.clone())))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient")
            .field("requests", &self.request_count())
            .finish()
    }
}

impl HttpClient for MockHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let result = (self.responder)(&request);
        Box::pin(async move { result })
    }
}
