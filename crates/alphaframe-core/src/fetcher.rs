//! Single GET with retry and linear backoff.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::http_client::{redact_api_key, HttpClient, HttpRequest, RawResponse};
use crate::retry::RetryPolicy;
use crate::AlphaError;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const LOGGED_BODY_CHARS: usize = 300;

/// Executes one provider call, retrying until the provider returns usable
/// data or the attempt budget runs out.
///
/// Exhausting the budget is not an error: the last HTTP response is returned
/// and callers must check [`RawResponse::is_valid`]. Only when no HTTP
/// response was ever received does `fetch` fail, with
/// [`AlphaError::Transport`].
#[derive(Clone)]
pub struct ResilientFetcher {
    client: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    timeout_ms: u64,
}

impl ResilientFetcher {
    pub fn new(client: Arc<dyn HttpClient>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Per-request deadline passed to the transport.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub async fn fetch(&self, url: &str, use_proxy: bool) -> Result<RawResponse, AlphaError> {
        let attempts = self.policy.attempts();
        let display_url = redact_api_key(url);
        let mut last_response: Option<RawResponse> = None;
        let mut last_transport_error = String::new();

        for attempt in 0..attempts {
            info!(
                attempt = attempt + 1,
                max_attempts = attempts,
                url = %display_url,
                "calling provider"
            );

            let request = HttpRequest::get(url)
                .with_timeout_ms(self.timeout_ms)
                .with_proxy(use_proxy);

            match self.client.execute(request).await {
                Ok(response) if response.is_valid() => return Ok(response),
                Ok(response) => {
                    warn!(
                        attempt = attempt + 1,
                        status = response.status,
                        body = %excerpt(&response.body),
                        "provider rejected the call"
                    );
                    last_response = Some(response);
                }
                Err(transport) if !transport.retryable() => {
                    error!(
                        url = %display_url,
                        error = %transport,
                        "non-retryable transport failure"
                    );
                    return Err(AlphaError::transport(transport.message()));
                }
                Err(transport) => {
                    warn!(attempt = attempt + 1, error = %transport, "transport failure");
                    last_transport_error = transport.message().to_owned();
                }
            }

            if attempt + 1 < attempts {
                let wait = self.policy.delay_for_attempt(attempt);
                info!(wait_secs = wait.as_secs_f64(), "waiting before the next request");
                tokio::time::sleep(wait).await;
            }
        }

        match last_response {
            Some(response) => {
                error!(
                    url = %display_url,
                    attempts,
                    status = response.status,
                    "retry budget exhausted, returning last failing response"
                );
                Ok(response)
            }
            None => Err(AlphaError::transport(format!(
                "{attempts} attempt(s) to {display_url} failed: {last_transport_error}"
            ))),
        }
    }
}

impl std::fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientFetcher")
            .field("policy", &self.policy)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

pub(crate) fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(LOGGED_BODY_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
