use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, REFERER};
use sync_logging::{sync_debug, sync_trace};

use crate::{FailureKind, HttpResponse, TransportError};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Sent verbatim as the `Authorization` header.
    pub token: Option<String>,
    pub referer: Option<String>,
    /// Extra attempts after a network failure or a 5xx/429 status.
    pub retries: u32,
    pub retry_backoff: Duration,
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            token: None,
            referer: None,
            retries: 3,
            retry_backoff: Duration::from_secs(1),
            proxy: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let client = build_client(&settings)?;
        Ok(Self { client, settings })
    }

    async fn attempt(&self, url: reqwest::Url) -> Result<HttpResponse, TransportError> {
        sync_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse { status, body })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut attempt = 0;
        loop {
            let result = self.attempt(parsed.clone()).await;
            let retry = match &result {
                Ok(response) => is_retryable_status(response.status),
                Err(err) => err.is_retryable(),
            };
            if !retry || attempt >= self.settings.retries {
                return result;
            }
            attempt += 1;
            sync_debug!(
                "Retrying GET {} (attempt {} of {})",
                url,
                attempt,
                self.settings.retries
            );
            tokio::time::sleep(self.settings.retry_backoff).await;
        }
    }
}

fn build_client(settings: &TransportSettings) -> Result<reqwest::Client, TransportError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = settings.token.as_deref().filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(token).map_err(config_error)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    if let Some(referer) = settings.referer.as_deref() {
        headers.insert(REFERER, HeaderValue::from_str(referer).map_err(config_error)?);
    }

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout);
    if let Some(proxy) = settings.proxy.as_deref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(config_error)?);
    }
    builder.build().map_err(config_error)
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

fn too_large(max_bytes: u64, actual: u64) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn config_error(err: impl std::fmt::Display) -> TransportError {
    TransportError::new(FailureKind::Configuration, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
