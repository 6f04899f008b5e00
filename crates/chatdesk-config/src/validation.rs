// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty site lists, valid bind addresses, and
//! well-formed webhook URLs.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ChatdeskConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate bind host
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // At least one site, with unique non-empty ids
    if config.sites.is_empty() {
        errors.push(ConfigError::Validation {
            message: "at least one [[sites]] entry is required".to_string(),
        });
    }
    let mut seen_ids = HashSet::new();
    for (i, site) in config.sites.iter().enumerate() {
        if site.id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("sites[{i}].id must not be empty"),
            });
        }
        if site.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("sites[{i}].name must not be empty"),
            });
        }
        if !seen_ids.insert(&site.id) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate site id `{}` in [[sites]] array", site.id),
            });
        }
    }

    // Auth constraints
    if config.auth.staff_domain.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "auth.staff_domain must not be empty".to_string(),
        });
    }
    if config.auth.min_pin_length < 4 {
        errors.push(ConfigError::Validation {
            message: format!(
                "auth.min_pin_length must be at least 4, got {}",
                config.auth.min_pin_length
            ),
        });
    }

    // Notify constraints
    if config.notify.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "notify.timeout_secs must be at least 1".to_string(),
        });
    }
    if let Some(url) = &config.notify.webhook_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("notify.webhook_url `{url}` must be an http(s) URL"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
