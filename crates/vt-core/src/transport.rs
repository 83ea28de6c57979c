//! HTTP seam between the job client / artifact fetcher and the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Status code and raw body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Single-shot HTTP calls. Implementations never retry; a connection-level
/// failure is reported as [`Error::Transport`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Authorized JSON POST.
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply>;

    /// Authorized GET.
    async fn get(&self, url: &str) -> Result<HttpReply>;

    /// Plain GET for public result URLs.
    async fn download(&self, url: &str) -> Result<HttpReply>;
}

/// [`Transport`] backed by `reqwest`, carrying the bearer key from [`ApiConfig`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    api_key: String,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    async fn read(response: reqwest::Response) -> Result<HttpReply> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn get(&self, url: &str) -> Result<HttpReply> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Self::read(response).await
    }

    async fn download(&self, url: &str) -> Result<HttpReply> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Self::read(response).await
    }
}
