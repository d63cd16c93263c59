//! Tracing setup

use anyhow::{anyhow, bail, Result};
use hr_agent::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{}' (expected compact, pretty or json)", other),
        }
    }
}

/// Filter directive for the configured level, raised by `-v` flags
pub fn filter_directive(config: &LoggingConfig, verbose: u8) -> String {
    match verbose {
        0 => config.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for responses and `--json` output.
pub fn init_tracing(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let format = LogFormat::parse(&config.format)?;
    let directive = filter_directive(config, verbose);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow!("invalid log filter '{}': {}", directive, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.colored)
        .with_writer(std::io::stderr);

    let result = match (format, config.timestamps) {
        (LogFormat::Compact, true) => builder.compact().try_init(),
        (LogFormat::Compact, false) => builder.compact().without_time().try_init(),
        (LogFormat::Pretty, true) => builder.pretty().try_init(),
        (LogFormat::Pretty, false) => builder.pretty().without_time().try_init(),
        (LogFormat::Json, true) => builder.json().try_init(),
        (LogFormat::Json, false) => builder.json().without_time().try_init(),
    };
    result.map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("").unwrap(), LogFormat::Compact);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_verbosity_overrides_level() {
        let config = LoggingConfig {
            level: "hr_agent=debug,warn".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_directive(&config, 0), "hr_agent=debug,warn");
        assert_eq!(filter_directive(&config, 1), "info");
        assert_eq!(filter_directive(&config, 5), "trace");
    }
}
