// ============================================================================
// Logging Setup
// tracing-subscriber initialization for binaries, demos and benches
// ============================================================================

use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is not set
    pub default_level: String,
    pub include_thread_names: bool,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_level: "info".to_string(),
            include_thread_names: true,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Reads `LOG_FORMAT`, `LOG_LEVEL` and `LOG_LOCATION`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or(defaults.default_level),
            include_location: env::var("LOG_LOCATION")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(defaults.include_location),
            ..defaults
        }
    }

    pub fn json() -> Self {
        Self {
            format: LogFormat::Json,
            include_location: true,
            ..Default::default()
        }
    }

    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Install a global subscriber.
///
/// # Errors
///
/// Fails when a global subscriber is already set.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer()
        .with_thread_names(config.include_thread_names)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init()?,
        LogFormat::Compact => registry.with(layer.compact()).try_init()?,
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_json_preset() {
        let config = LogConfig::json().with_default_level("debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.default_level, "debug");
        assert!(config.include_location);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging(LogConfig::default());
        assert!(init_logging(LogConfig::default()).is_err());
    }
}
