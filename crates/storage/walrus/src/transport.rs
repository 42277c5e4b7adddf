//! HTTP transport with bounded retry and per-attempt timeout.

use std::future::Future;

use storage_core::TransportError;

use crate::config::TransportConfig;

/// Fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Outbound request wrapper.
///
/// Holds only read-only configuration and a shared `reqwest::Client`; no
/// state is carried between calls.
#[derive(Debug, Clone)]
pub struct RetryableTransport {
    config: TransportConfig,
    http_client: reqwest::Client,
}

impl RetryableTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: TransportConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Client used to build requests for [`send`](Self::send).
    pub fn http(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Send a request, retrying on timeout, connection failure, or non-2xx status.
    ///
    /// The body of a non-2xx response is read before the attempt is classified,
    /// so the final error always carries the server's diagnostic text.
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, TransportError> {
        if request.try_clone().is_none() {
            return Err(TransportError::Request(
                "streaming request bodies cannot be retried".to_string(),
            ));
        }

        let label = request
            .try_clone()
            .and_then(|builder| builder.build().ok())
            .map(|req| format!("{} {}", req.method(), req.url()))
            .unwrap_or_else(|| "request".to_string());

        self.retry(&label, |_| execute(request.try_clone())).await
    }

    /// Run `op` with the configured timeout and retry policy.
    ///
    /// `op` receives the 1-based attempt number. It is called at most
    /// `max_retries + 1` times, with a fixed `retry_delay` between attempts.
    pub async fn retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let TransportConfig {
            max_retries,
            retry_delay,
            request_timeout,
        } = self.config;

        let mut remaining = max_retries;
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(request_timeout, op(attempt)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(request_timeout)),
            };

            match result {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(value);
                }
                Err(err) if remaining > 0 => {
                    tracing::warn!(
                        "{} failed on attempt {}: {}. {} retries left, waiting {:?}",
                        label,
                        attempt,
                        err,
                        remaining,
                        retry_delay
                    );
                    tokio::time::sleep(retry_delay).await;
                    remaining -= 1;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!("{} failed after {} attempts: {}", label, attempt, err);
                    return Err(err);
                }
            }
        }
    }
}

async fn execute(request: Option<reqwest::RequestBuilder>) -> Result<HttpResponse, TransportError> {
    let request = request.ok_or_else(|| {
        TransportError::Request("streaming request bodies cannot be retried".to_string())
    })?;

    let response = request
        .send()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::Request(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(HttpResponse {
        status: status.as_u16(),
        body: body.to_vec(),
    })
}
