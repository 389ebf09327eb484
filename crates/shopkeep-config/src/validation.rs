// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid URLs, non-empty paths, and non-zero limits.

use crate::diagnostic::ConfigError;
use crate::model::ShopConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ShopConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.agent.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` must be one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.agent.max_tool_rounds == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.max_tool_rounds must be at least 1".to_string(),
        });
    }

    let base_url = config.provider.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("provider.base_url `{base_url}` must be an http(s) URL"),
        });
    }

    if config.provider.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.default_model must not be empty".to_string(),
        });
    }

    if config.provider.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "provider.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.media.root_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "media.root_dir must not be empty".to_string(),
        });
    }

    if !config.media.public_prefix.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "media.public_prefix `{}` must start with `/`",
                config.media.public_prefix
            ),
        });
    } else if config.media.public_prefix.trim_matches('/').is_empty() {
        errors.push(ConfigError::Validation {
            message: "media.public_prefix must not be the site root".to_string(),
        });
    }

    if config.media.max_upload_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "media.max_upload_bytes must be greater than 0".to_string(),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.gateway.history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.history_limit must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
