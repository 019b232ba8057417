//! Structured logging setup.
//!
//! Logging is configured from the environment:
//!
//! - `LOG_LEVEL` - trace, debug, info (default), warn, error. Unrecognised
//!   values fall back to debug.
//! - `LOG_FORMAT` - `json` switches to JSON lines; anything else is the
//!   human-readable console format.
//!
//! Logs always go to stderr; stdout is left for document output.

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const DEFAULT_LOG_LEVEL: &str = "info";
const JSON_LOG_FORMAT: &str = "json";

/// Logging configuration resolved from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub use_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
        }
    }
}

impl LoggingConfig {
    /// Builds the configuration from raw `LOG_LEVEL` / `LOG_FORMAT` values
    pub fn from_values(level: Option<&str>, format: Option<&str>) -> Self {
        let level = parse_level(level.unwrap_or(DEFAULT_LOG_LEVEL));
        let use_json = format
            .map(|f| f.eq_ignore_ascii_case(JSON_LOG_FORMAT))
            .unwrap_or(false);
        Self { level, use_json }
    }

    pub fn from_env() -> Self {
        let level = env::var("LOG_LEVEL").ok();
        let format = env::var("LOG_FORMAT").ok();
        Self::from_values(level.as_deref(), format.as_deref())
    }
}

/// Parses a log level, falling back to DEBUG for unrecognised input.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "" => Level::INFO,
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "fatal" | "panic" => Level::ERROR,
        _ => Level::DEBUG,
    }
}

/// Installs the global subscriber. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_new(config.level.as_str().to_lowercase())
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
