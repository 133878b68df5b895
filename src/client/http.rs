//! HTTP client for the FAQ answer service.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{Answer, AnswerService, FaqRequest};
use crate::config::EndpointConfig;
use crate::error::{Error, Result};

/// Default path of the question endpoint.
pub const DEFAULT_FAQ_PATH: &str = "/api/faq";

/// Default path of the health endpoint.
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// How long the startup health probe may take.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// `"healthy"` when the service is up.
    pub status: String,
}

impl HealthStatus {
    /// Whether the service reported itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// [`AnswerService`] backed by `POST /api/faq`.
///
/// # Example
///
/// ```rust,no_run
/// use faq_chat_widget::client::{AnswerService, HttpAnswerClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpAnswerClient::new("http://127.0.0.1:8000")?;
/// let answer = client.ask("How do I apply?").await?;
/// println!("{}", answer.display_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAnswerClient {
    endpoint: Url,
    health: Url,
    http: reqwest::Client,
}

impl HttpAnswerClient {
    /// Create a client for a service rooted at `base_url`, using the default paths.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(
            base_url,
            DEFAULT_FAQ_PATH,
            DEFAULT_HEALTH_PATH,
            reqwest::Client::new(),
        )
    }

    /// Create a client with a custom reqwest client and paths.
    pub fn with_client(
        base_url: impl AsRef<str>,
        path: &str,
        health_path: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let base = base_url.as_ref().trim_end_matches('/');
        Ok(Self {
            endpoint: Url::parse(&format!("{base}{path}"))?,
            health: Url::parse(&format!("{base}{health_path}"))?,
            http,
        })
    }

    /// Create a client from endpoint configuration.
    ///
    /// No timeout is applied unless `timeout_secs` is set.
    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_client(
            &config.base_url,
            &config.path,
            &config.health_path,
            builder.build()?,
        )
    }

    /// URL questions are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Probe the health endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.http.get(self.health.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Probe the health endpoint, giving up after `limit` with [`Error::Timeout`].
    pub async fn health_within(&self, limit: Duration) -> Result<HealthStatus> {
        tokio::time::timeout(limit, self.health())
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    async fn api_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        Error::Api { status, message }
    }
}

#[async_trait::async_trait]
impl AnswerService for HttpAnswerClient {
    async fn ask(&self, question: &str) -> Result<Answer> {
        debug!(
            name: "faq.request.sent",
            endpoint = %self.endpoint,
            question_len = question.len(),
            "Sending question"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&FaqRequest { question })
            .send()
            .await?;

        let status = response.status();
        debug!(name: "faq.response.status", status = status.as_u16(), "Response status");

        if !status.is_success() {
            let err = Self::api_error(response).await;
            warn!(name: "faq.response.rejected", error = %err, "Answer service rejected question");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(Answer::from_json(&body))
    }
}
