//! Client configuration.

use crate::error::{LangflowError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the run endpoint URL.
pub const API_URL_ENV: &str = "LANGFLOW_API_URL";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "LANGFLOW_API_KEY";

/// Configuration for a Langflow run endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct LangflowConfig {
    /// Full URL of the flow's run endpoint.
    ///
    /// Example: "http://localhost:7860/api/v1/run/<flow-id>"
    pub api_url: String,

    /// API key sent as a bearer token.
    pub api_key: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// `output_type` field of the run request.
    #[serde(default = "default_io_type")]
    pub output_type: String,

    /// `input_type` field of the run request.
    #[serde(default = "default_io_type")]
    pub input_type: String,
}

impl LangflowConfig {
    /// Create a new configuration.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            output_type: default_io_type(),
            input_type: default_io_type(),
        }
    }

    /// Create configuration from `LANGFLOW_API_URL` and `LANGFLOW_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var(API_URL_ENV)
            .map_err(|_| LangflowError::Config(format!("{} must be set", API_URL_ENV)))?;
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| LangflowError::Config(format!("{} must be set", API_KEY_ENV)))?;

        let config = Self::new(api_url, api_key);
        config.validate()?;
        Ok(config)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the request `output_type`.
    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    /// Set the request `input_type`.
    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    /// Check that URL and key are usable.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(LangflowError::Config(format!(
                "API URL is empty (set {})",
                API_URL_ENV
            )));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(LangflowError::Config(format!(
                "API URL must start with http:// or https://, got {}",
                self.api_url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(LangflowError::Config(format!(
                "API key is empty (set {})",
                API_KEY_ENV
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LangflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangflowConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("output_type", &self.output_type)
            .field("input_type", &self.input_type)
            .finish()
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    2
}

fn default_io_type() -> String {
    "chat".to_string()
}
