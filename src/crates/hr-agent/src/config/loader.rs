//! Configuration loader
//!
//! Layers, later ones overriding earlier ones key by key:
//! 1. Default values
//! 2. User-level config: ~/.hr-agent/config.toml
//! 3. Project-level config: ./.hr-agent/config.toml
//! 4. An explicit file (`--config`)
//! 5. Environment variables
//!
//! String values may reference the environment as `${VAR}` or
//! `${VAR:default}`.

use crate::config::schema::HrAgentConfig;
use crate::error::{HrAgentError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;
use tracing::{debug, info};

/// Directory holding the config file at user and project level
pub const CONFIG_DIR: &str = ".hr-agent";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

pub const THRESHOLD_ENV: &str = "APPROVAL_THRESHOLD_DAYS";
pub const LOG_ENV: &str = "HR_AGENT_LOG";

static ENV_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^:}]+)(?::([^}]*))?\}").unwrap());

/// Loads [`HrAgentConfig`] from its layered sources
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE)),
            project_config_path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE),
            explicit_path: None,
        }
    }

    /// Add a file that overrides user and project config; it must exist
    pub fn with_explicit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Replace the user and project locations
    pub fn with_paths(mut self, user: Option<PathBuf>, project: impl Into<PathBuf>) -> Self {
        self.user_config_path = user;
        self.project_config_path = project.into();
        self
    }

    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }

    /// Load all layers, reading overrides from the process environment
    pub async fn load(&self) -> Result<HrAgentConfig> {
        self.load_with_env(|key| std::env::var(key).ok()).await
    }

    /// Load all layers with a custom environment lookup
    pub async fn load_with_env<F>(&self, env: F) -> Result<HrAgentConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = toml::Table::new();

        if let Some(user) = &self.user_config_path {
            self.merge_optional(&mut merged, user, "user").await?;
        }
        self.merge_optional(&mut merged, &self.project_config_path, "project")
            .await?;

        if let Some(explicit) = &self.explicit_path {
            let table = read_table(explicit).await?.ok_or_else(|| {
                HrAgentError::Config(format!("Config file not found: {}", explicit.display()))
            })?;
            debug!(path = %explicit.display(), "Loaded explicit config");
            merge_tables(&mut merged, table);
        }

        let mut value = toml::Value::Table(merged);
        expand_variables(&mut value, &env);

        let mut config: HrAgentConfig = value
            .try_into()
            .map_err(|e| HrAgentError::Config(format!("Invalid configuration: {}", e)))?;

        apply_env_overrides(&mut config, &env)?;

        info!(
            threshold_days = config.approval.threshold_days,
            api_url_set = !config.langflow.api_url.is_empty(),
            "Configuration loaded"
        );
        Ok(config)
    }

    async fn merge_optional(&self, merged: &mut toml::Table, path: &Path, layer: &str) -> Result<()> {
        match read_table(path).await? {
            Some(table) => {
                debug!(path = %path.display(), layer, "Loaded config layer");
                merge_tables(merged, table);
            }
            None => {
                debug!(path = %path.display(), layer, "Config layer not present");
            }
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await.map_err(|e| {
        HrAgentError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let table = content.parse::<toml::Table>().map_err(|e| {
        HrAgentError::Config(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    Ok(Some(table))
}

/// Recursively merge `overlay` into `base`; nested tables merge key by key
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn expand_variables<F>(value: &mut toml::Value, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        toml::Value::String(s) => {
            if let Some(expanded) = expand_env_in_string(s, env) {
                *s = expanded;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                expand_variables(v, env);
            }
        }
        toml::Value::Array(items) => {
            for item in items.iter_mut() {
                expand_variables(item, env);
            }
        }
        _ => {}
    }
}

/// Expand `${VAR}` and `${VAR:default}`; unset variables without a default
/// become empty
fn expand_env_in_string<F>(s: &str, env: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !s.contains("${") {
        return None;
    }

    let expanded = ENV_REF_REGEX.replace_all(s, |caps: &regex::Captures<'_>| {
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        env(&caps[1]).unwrap_or_else(|| default.to_string())
    });
    Some(expanded.into_owned())
}

fn apply_env_overrides<F>(config: &mut HrAgentConfig, env: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(langflow_client::API_URL_ENV) {
        config.langflow.api_url = url;
    }
    if let Some(key) = non_empty(langflow_client::API_KEY_ENV) {
        config.langflow.api_key = key;
    }
    if let Some(raw) = non_empty(THRESHOLD_ENV) {
        config.approval.threshold_days = raw.trim().parse().map_err(|_| {
            HrAgentError::Config(format!(
                "{} must be a non-negative whole number, got '{}'",
                THRESHOLD_ENV, raw
            ))
        })?;
    }
    if let Some(level) = non_empty(LOG_ENV) {
        config.logging.level = level;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn isolated(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new().with_paths(
            Some(dir.path().join("user.toml")),
            dir.path().join("project.toml"),
        )
    }

    #[test]
    fn test_default_paths() {
        let loader = ConfigLoader::new();
        assert!(loader.project_config_path().ends_with(".hr-agent/config.toml"));
        if let Some(user) = loader.user_config_path() {
            assert!(user.ends_with(".hr-agent/config.toml"));
        }
    }

    #[tokio::test]
    async fn test_defaults_when_no_files() {
        let dir = TempDir::new().unwrap();
        let config = isolated(&dir).load_with_env(no_env).await.unwrap();
        assert_eq!(config, HrAgentConfig::default());
    }

    #[tokio::test]
    async fn test_project_overrides_user_key_by_key() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("user.toml"),
            r#"
[langflow]
api_url = "http://user-host/run"
timeout_secs = 10

[approval]
threshold_days = 3
"#,
        )
        .await
        .unwrap();
        fs::write(
            dir.path().join("project.toml"),
            r#"
[langflow]
api_url = "http://project-host/run"
"#,
        )
        .await
        .unwrap();

        let config = isolated(&dir).load_with_env(no_env).await.unwrap();

        assert_eq!(config.langflow.api_url, "http://project-host/run");
        assert_eq!(config.langflow.timeout_secs, 10);
        assert_eq!(config.approval.threshold_days, 3);
        assert_eq!(config.logging.level, "warn");
    }

    #[tokio::test]
    async fn test_explicit_file_wins_and_must_exist() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("project.toml"), "[approval]\nthreshold_days = 3\n")
            .await
            .unwrap();
        let explicit = dir.path().join("ci.toml");
        fs::write(&explicit, "[approval]\nthreshold_days = 8\n").await.unwrap();

        let config = isolated(&dir)
            .with_explicit_path(&explicit)
            .load_with_env(no_env)
            .await
            .unwrap();
        assert_eq!(config.approval.threshold_days, 8);

        let err = isolated(&dir)
            .with_explicit_path(dir.path().join("missing.toml"))
            .load_with_env(no_env)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[tokio::test]
    async fn test_env_overrides_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("project.toml"),
            "[langflow]\napi_url = \"http://file/run\"\napi_key = \"file-key\"\n",
        )
        .await
        .unwrap();

        let env = env_from(&[
            ("LANGFLOW_API_URL", "http://env/run"),
            ("APPROVAL_THRESHOLD_DAYS", "10"),
            ("HR_AGENT_LOG", "debug"),
        ]);
        let config = isolated(&dir).load_with_env(env).await.unwrap();

        assert_eq!(config.langflow.api_url, "http://env/run");
        assert_eq!(config.langflow.api_key, "file-key");
        assert_eq!(config.approval.threshold_days, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[tokio::test]
    async fn test_invalid_threshold_env_is_error() {
        let dir = TempDir::new().unwrap();
        let env = env_from(&[("APPROVAL_THRESHOLD_DAYS", "five")]);
        let err = isolated(&dir).load_with_env(env).await.unwrap_err();
        assert!(matches!(err, HrAgentError::Config(ref msg) if msg.contains("APPROVAL_THRESHOLD_DAYS")));
    }

    #[tokio::test]
    async fn test_variable_expansion() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("project.toml"),
            r#"
[langflow]
api_url = "${LF_HOST:http://localhost:7860}/api/v1/run/leave"
api_key = "${LF_SECRET}"
"#,
        )
        .await
        .unwrap();

        let config = isolated(&dir)
            .load_with_env(env_from(&[("LF_SECRET", "sk-from-env")]))
            .await
            .unwrap();

        assert_eq!(config.langflow.api_url, "http://localhost:7860/api/v1/run/leave");
        assert_eq!(config.langflow.api_key, "sk-from-env");
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("user.toml"), "[approval\nthreshold_days = ")
            .await
            .unwrap();

        let err = isolated(&dir).load_with_env(no_env).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
