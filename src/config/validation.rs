//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check base path shape so prefix stripping behaves predictably
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("routing.base_paths: '{0}' must start with '/'")]
    BasePathMissingSlash(String),

    #[error("routing.base_paths: '{0}' must not end with '/'")]
    BasePathTrailingSlash(String),

    #[error("routing.base_paths: '{0}' listed more than once")]
    DuplicateBasePath(String),

    #[error("routing.base_paths: '{base}' is unreachable, '{shadowed_by}' is listed earlier")]
    ShadowedBasePath { base: String, shadowed_by: String },

    #[error("observability.log_level: unknown level '{0}'")]
    LogLevel(String),
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    let mut seen = HashSet::new();
    for (i, base) in config.routing.base_paths.iter().enumerate() {
        if !seen.insert(base.as_str()) {
            errors.push(ValidationError::DuplicateBasePath(base.clone()));
            continue;
        }
        // The first matching prefix is stripped, so an earlier prefix of this
        // entry always wins.
        if let Some(earlier) = config.routing.base_paths[..i]
            .iter()
            .find(|earlier| base.starts_with(earlier.as_str()))
        {
            errors.push(ValidationError::ShadowedBasePath {
                base: base.clone(),
                shadowed_by: earlier.clone(),
            });
        }
        // Empty prefix is the "served from root" entry.
        if base.is_empty() {
            continue;
        }
        if !base.starts_with('/') {
            errors.push(ValidationError::BasePathMissingSlash(base.clone()));
        } else if base.ends_with('/') {
            errors.push(ValidationError::BasePathTrailingSlash(base.clone()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
