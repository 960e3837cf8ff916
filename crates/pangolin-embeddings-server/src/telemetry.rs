//! Telemetry configuration
//!
//! Structured logging for the embeddings server. `RUST_LOG` always wins over
//! the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Transport crates that are noisy at `debug` and below
const QUIET_TARGETS: &[&str] = &["h2", "hyper", "tower", "reqwest"];

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log level
    pub log_level: String,

    /// Whether to use JSON formatting
    pub json_format: bool,

    /// Whether to include thread IDs
    pub include_thread_ids: bool,

    /// Whether to include target module
    pub include_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_format: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Create a new telemetry config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Configure thread ID inclusion
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.include_thread_ids = enabled;
        self
    }

    /// Configure target module inclusion
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.include_target = enabled;
        self
    }

    /// Apply overrides from the environment
    ///
    /// - `LOG_FORMAT` - "json" for JSON formatting, anything else for pretty
    /// - `LOG_THREAD_IDS` - "true" or "false"
    /// - `LOG_TARGET` - "true" or "false"
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.json_format = format.eq_ignore_ascii_case("json");
        }
        if let Some(enabled) = env_flag("LOG_THREAD_IDS") {
            self.include_thread_ids = enabled;
        }
        if let Some(enabled) = env_flag("LOG_TARGET") {
            self.include_target = enabled;
        }
        self
    }

    /// Filter directives for the configured level
    pub fn filter_directives(&self) -> String {
        let mut directives = self.log_level.clone();
        for target in QUIET_TARGETS {
            directives.push_str(&format!(",{}=warn", target));
        }
        directives
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|value| value.eq_ignore_ascii_case("true"))
}

/// Initialize telemetry with custom configuration
///
/// # Errors
///
/// Fails if the level is not a valid filter or a global subscriber is
/// already installed.
pub fn init_with_config(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directives())?,
    };

    if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_timer(fmt::time::SystemTime)
                    .with_target(config.include_target)
                    .with_thread_ids(config.include_thread_ids),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_timer(fmt::time::SystemTime)
                    .with_target(config.include_target)
                    .with_thread_ids(config.include_thread_ids),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_format);
        assert!(!config.include_thread_ids);
        assert!(config.include_target);
    }

    #[test]
    fn test_telemetry_config_builder() {
        let config = TelemetryConfig::new()
            .with_log_level("debug")
            .with_json_format(true)
            .with_thread_ids(true);

        assert_eq!(config.log_level, "debug");
        assert!(config.json_format);
        assert!(config.include_thread_ids);
    }

    #[test]
    fn test_filter_directives() {
        let directives = TelemetryConfig::new().with_log_level("debug").filter_directives();
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("h2=warn"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
