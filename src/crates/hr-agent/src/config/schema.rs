//! Configuration schema

use crate::policy::{ApprovalPolicy, DEFAULT_THRESHOLD_DAYS};
use langflow_client::LangflowConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HrAgentConfig {
    /// Upstream agent endpoint
    #[serde(default)]
    pub langflow: LangflowSettings,

    /// Approval threshold
    #[serde(default)]
    pub approval: ApprovalSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream agent endpoint
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LangflowSettings {
    /// Full run endpoint URL, e.g. "http://localhost:7860/api/v1/run/<flow-id>"
    pub api_url: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient failures
    pub max_retries: u32,

    pub output_type: String,
    pub input_type: String,
}

impl Default for LangflowSettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
            max_retries: 2,
            output_type: "chat".to_string(),
            input_type: "chat".to_string(),
        }
    }
}

impl LangflowSettings {
    /// Client configuration for these settings
    pub fn client_config(&self) -> LangflowConfig {
        LangflowConfig::new(&self.api_url, &self.api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_output_type(&self.output_type)
            .with_input_type(&self.input_type)
    }
}

impl std::fmt::Debug for LangflowSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangflowSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("output_type", &self.output_type)
            .field("input_type", &self.input_type)
            .finish()
    }
}

/// Approval threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSettings {
    /// Requests for more days than this need a reviewer
    pub threshold_days: u32,
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
        }
    }
}

impl ApprovalSettings {
    pub fn policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::new(self.threshold_days)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: "trace", "debug", "info", "warn", "error",
    /// or e.g. "hr_agent=debug,info"
    pub level: String,

    /// Log format: "compact", "pretty", "json"
    pub format: String,

    /// Enable colored output
    pub colored: bool,

    /// Show timestamps
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            colored: true,
            timestamps: true,
        }
    }
}

impl HrAgentConfig {
    /// Copy with the API key masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.langflow.api_key.is_empty() {
            config.langflow.api_key = "********".to_string();
        }
        config
    }

    /// Render as TOML with the API key masked
    pub fn to_redacted_toml(&self) -> String {
        toml::to_string_pretty(&self.redacted())
            .unwrap_or_else(|e| format!("# unable to render configuration: {}\n", e))
    }
}
