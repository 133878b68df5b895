//! Layered configuration.
//!
//! Priority: CLI flag > CLI env var > `FAQ_CHAT__*` env > config file > defaults.

use std::path::Path;

use clap::{Parser, ValueEnum};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::client::{DEFAULT_FAQ_PATH, DEFAULT_HEALTH_PATH};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with an FAQ answer service from the terminal", long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the answer service
    #[arg(long, env = "FAQ_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, env = "FAQ_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Open the chat panel on start
    #[arg(long)]
    pub open: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub widget: WidgetSettings,
    pub logging: LoggingConfig,
}

/// Where the answer service lives.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub base_url: String,
    pub path: String,
    pub health_path: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Widget behavior knobs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Cap for the auto-growing input, in pixels.
    pub max_input_height: u32,
    /// Open the panel as soon as the widget mounts.
    pub start_open: bool,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            max_input_height: 200,
            start_open: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;

        let defaults = WidgetSettings::default();
        let mut builder = Config::builder()
            .set_default("endpoint.base_url", "http://127.0.0.1:8000")?
            .set_default("endpoint.path", DEFAULT_FAQ_PATH)?
            .set_default("endpoint.health_path", DEFAULT_HEALTH_PATH)?
            .set_default("widget.max_input_height", defaults.max_input_height)?
            .set_default("widget.start_open", defaults.start_open)?
            .set_default("logging.format", LogFormat::default().as_str())?;

        // Explicit file must exist; the cwd fallback is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml));
        }

        // E.g. FAQ_CHAT__ENDPOINT__BASE_URL=http://faq.internal:8000
        builder = builder.add_source(
            Environment::with_prefix("FAQ_CHAT")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(endpoint) = cli.endpoint {
            builder = builder.set_override("endpoint.base_url", endpoint)?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("endpoint.timeout_secs", secs)?;
        }
        if cli.open {
            builder = builder.set_override("widget.start_open", true)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::from_str("text", true).unwrap(), LogFormat::Text);
    }

    #[test]
    fn test_widget_defaults() {
        let settings = WidgetSettings::default();
        assert_eq!(settings.max_input_height, 200);
        assert!(!settings.start_open);
    }
}
