//! Configuration management for the enrichment pipeline
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.aimalign/config.toml, or a path given with --config.

use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub oracle: OracleConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
}

/// Oracle endpoint and per-stage request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub classify_model: String,
    pub suggest_model: String,
    pub classify_temperature: f32,
    pub suggest_temperature: f32,
    pub suggest_max_tokens: u32,
    pub request_timeout_secs: u64,
}

/// Bounded-retry policy shared by both stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Stage pacing, checkpoint frequency, and input filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum delay between classification oracle calls (milliseconds)
    pub classify_call_spacing_ms: u64,
    /// Minimum delay between suggestion oracle calls (milliseconds)
    pub suggest_call_spacing_ms: u64,
    /// Flush the output file after this many completed units
    pub save_frequency: usize,
    /// Rows whose outcome details contain any of these are dropped at load
    pub placeholder_patterns: Vec<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            classify_model: "gpt-4.1-mini".to_string(),
            suggest_model: "gpt-4.1-mini".to_string(),
            classify_temperature: 0.2,
            suggest_temperature: 0.6,
            suggest_max_tokens: 300,
            request_timeout_secs: 60,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 16_000,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classify_call_spacing_ms: 1000,
            suggest_call_spacing_ms: 1500,
            save_frequency: 1,
            placeholder_patterns: vec![
                "No learning outcomes found".to_string(),
                "This course is being discontinued".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| PipelineError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".aimalign").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.oracle.base_url.is_empty() {
            return Err(PipelineError::ConfigError(
                "oracle.base_url must not be empty".to_string(),
            ));
        }

        if self.oracle.request_timeout_secs == 0 {
            return Err(PipelineError::ConfigError(
                "oracle.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (name, temp) in [
            ("classify_temperature", self.oracle.classify_temperature),
            ("suggest_temperature", self.oracle.suggest_temperature),
        ] {
            if !(0.0..=2.0).contains(&temp) {
                return Err(PipelineError::ConfigError(format!(
                    "oracle.{} must be between 0.0 and 2.0",
                    name
                )));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(PipelineError::ConfigError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(PipelineError::ConfigError(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".to_string(),
            ));
        }

        if self.pipeline.save_frequency == 0 {
            return Err(PipelineError::ConfigError(
                "pipeline.save_frequency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the oracle API key from the configured environment variable.
    ///
    /// A missing or empty key is a fatal setup error, reported before any
    /// oracle call is attempted.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.oracle.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PipelineError::CredentialError(format!(
                "{} not set in the environment",
                self.oracle.api_key_env
            ))),
        }
    }
}
