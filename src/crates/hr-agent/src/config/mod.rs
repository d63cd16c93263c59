//! Configuration management
//!
//! Supports layered configuration:
//! - User-level: ~/.hr-agent/config.toml
//! - Project-level: ./.hr-agent/config.toml
//! - An explicit file passed on the command line
//! - Environment variables (`LANGFLOW_API_URL`, `LANGFLOW_API_KEY`,
//!   `APPROVAL_THRESHOLD_DAYS`, `HR_AGENT_LOG`)

mod loader;
mod schema;

pub use loader::{ConfigLoader, CONFIG_DIR, CONFIG_FILE, LOG_ENV, THRESHOLD_ENV};
pub use schema::{ApprovalSettings, HrAgentConfig, LangflowSettings, LoggingConfig};

use crate::Result;
use std::path::Path;

/// Load configuration from every layer, with `explicit` taking precedence
/// over the user and project files.
pub async fn load_config(explicit: Option<&Path>) -> Result<HrAgentConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = explicit {
        loader = loader.with_explicit_path(path);
    }
    loader.load().await
}
