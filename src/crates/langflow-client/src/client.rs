//! Langflow run endpoint client.
//!
//! # Example
//!
//! ```rust,ignore
//! use langflow_client::{AgentBackend, LangflowClient, LangflowConfig};
//!
//! let client = LangflowClient::new(LangflowConfig::from_env()?)?;
//! let reply = client.query("How many vacation days do I have?", "session-1").await?;
//! println!("{}", reply.response);
//! ```

use crate::config::{LangflowConfig, API_KEY_ENV};
use crate::error::{LangflowError, Result};
use crate::parse::extract_message_text;
use crate::retry::RetryPolicy;
use crate::types::{AgentReply, RunRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Anything that can answer a user message on behalf of the HR agent.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Send one user message within a conversation session.
    async fn query(&self, message: &str, session_id: &str) -> Result<AgentReply>;
}

/// Generate a fresh conversation session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// HTTP client for a Langflow flow's run endpoint.
#[derive(Clone)]
pub struct LangflowClient {
    config: LangflowConfig,
    client: Client,
    retry: RetryPolicy,
}

impl LangflowClient {
    /// Create a client; fails when the configuration is incomplete.
    pub fn new(config: LangflowConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder().timeout(config.timeout).build()?;
        let retry = RetryPolicy::from_max_retries(config.max_retries);

        Ok(Self {
            config,
            client,
            retry,
        })
    }

    /// Replace the retry policy derived from `max_retries`.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Client configuration.
    pub fn config(&self) -> &LangflowConfig {
        &self.config
    }

    /// Send a message and interpret the reply, retrying transient failures.
    #[tracing::instrument(skip(self, message), fields(url = %self.config.api_url))]
    pub async fn run(&self, message: &str, session_id: &str) -> Result<AgentReply> {
        let request = RunRequest {
            output_type: self.config.output_type.clone(),
            input_type: self.config.input_type.clone(),
            input_value: message.to_string(),
            session_id: session_id.to_string(),
        };

        let mut attempt = 0;
        loop {
            match self.send(&request).await {
                Ok(reply) => {
                    tracing::debug!(
                        attempts = attempt + 1,
                        structured = reply.structured,
                        "Langflow call succeeded"
                    );
                    return Ok(reply);
                }
                Err(e) if e.is_retryable() && self.retry.should_retry(attempt + 1) => {
                    let delay = self.retry.calculate_delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Langflow call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_auth_error() {
                        tracing::error!(key_env = API_KEY_ENV, "Langflow rejected the API key");
                    }
                    tracing::error!(attempts = attempt + 1, error = %e, "Langflow call failed");
                    return Err(e);
                }
            }
        }
    }

    async fn send(&self, request: &RunRequest) -> Result<AgentReply> {
        let body = serde_json::to_vec(request)?;
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LangflowError::from_status(status.as_u16(), body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| LangflowError::InvalidResponse(format!("body is not JSON: {}", e)))?;
        let text = extract_message_text(&value)?;

        Ok(AgentReply::from_text(text))
    }
}

#[async_trait]
impl AgentBackend for LangflowClient {
    async fn query(&self, message: &str, session_id: &str) -> Result<AgentReply> {
        self.run(message, session_id).await
    }
}

impl std::fmt::Debug for LangflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangflowClient")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish()
    }
}
