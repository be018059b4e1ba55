//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Artifact location relative to the service binary
const DEFAULT_MODEL_FILE: &str = "models/hypertension_model_final.onnx";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Path to the ONNX classifier
    pub model_path: PathBuf,

    /// Name of the probability output of the classifier graph
    pub model_output_name: String,

    /// Attach mock wearable telemetry to predictions
    pub include_mock_wearable: bool,

    /// Reject clinically implausible values instead of passing them through
    pub strict_ranges: bool,

    /// Log output format
    pub log_format: LogFormat,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            model_path: default_model_path(),
            model_output_name: "probabilities".to_string(),
            include_mock_wearable: true,
            strict_ranges: false,
            log_format: LogFormat::Pretty,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            model_output_name: env::var("MODEL_OUTPUT_NAME")
                .unwrap_or(defaults.model_output_name),

            include_mock_wearable: env::var("INCLUDE_MOCK_WEARABLE")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.include_mock_wearable),

            strict_ranges: env::var("STRICT_RANGES")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.strict_ranges),

            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => defaults.log_format,
            },

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Resolve the model next to the running executable, falling back to the
/// working directory when the executable path is unavailable.
fn default_model_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_MODEL_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILE))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
