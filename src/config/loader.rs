//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "BOOKSTORE_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {key} has invalid value '{value}'")]
    Env { key: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => AppConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay `BOOKSTORE_*` variables on top of `config`.
///
/// `lookup` is the variable source, `std::env::var` in production.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = var("BIND_ADDRESS") {
        config.listener.bind_address = value;
    }
    if let Some((_, value)) = var("BASE_PATHS") {
        config.routing.base_paths = value.split(',').map(|p| p.trim().to_string()).collect();
    }
    if let Some((key, value)) = var("STRICT_TEMPLATES") {
        config.routing.strict_templates = parse_bool(&key, &value)?;
    }
    if let Some((key, value)) = var("REQUEST_TIMEOUT_SECS") {
        config.timeouts.request_secs = value.parse().map_err(|_| invalid(&key, &value))?;
    }
    if let Some((key, value)) = var("MAX_BODY_SIZE") {
        config.security.max_body_size = value.parse().map_err(|_| invalid(&key, &value))?;
    }
    if let Some((_, value)) = var("LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some((key, value)) = var("LOG_FORMAT") {
        config.observability.log_format = match value.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => return Err(invalid(&key, &value)),
        };
    }
    if let Some((key, value)) = var("METRICS_ENABLED") {
        config.observability.metrics_enabled = parse_bool(&key, &value)?;
    }
    if let Some((_, value)) = var("METRICS_ADDRESS") {
        config.observability.metrics_address = value;
    }
    if let Some((_, value)) = var("CATALOG_SEED") {
        config.catalog.seed_path = Some(value).filter(|v| !v.is_empty());
    }

    Ok(config)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    }
}
