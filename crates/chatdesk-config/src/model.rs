// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Chatdesk backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Chatdesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values, except `sites` which validation requires to be non-empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatdeskConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Staff authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Outbound webhook notification settings.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Operating locations customers can start a chat from.
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

/// Staff authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Internal domain suffix for derived staff login identifiers
    /// (`<username>@<staff_domain>`). Never a real mail domain.
    #[serde(default = "default_staff_domain")]
    pub staff_domain: String,

    /// Minimum accepted PIN length.
    #[serde(default = "default_min_pin_length")]
    pub min_pin_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            staff_domain: default_staff_domain(),
            min_pin_length: default_min_pin_length(),
        }
    }
}

/// Outbound webhook notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Webhook endpoint for chat event cards. None disables notifications.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Base URL used to build deep links into the staff UI.
    #[serde(default)]
    pub app_base_url: Option<String>,

    /// Bound on each delivery attempt, in seconds. Notifications must never
    /// stall the primary transaction path.
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            app_base_url: None,
            timeout_secs: default_notify_timeout(),
        }
    }
}

/// One operating location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Stable site identifier used in conversation rows.
    pub id: String,
    /// Human-readable site name, used in notification titles.
    pub name: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("chatdesk/chatdesk.db").display().to_string())
        .unwrap_or_else(|| "chatdesk.db".to_string())
}

fn default_true() -> bool {
    true
}

fn default_staff_domain() -> String {
    "staff.chatdesk".to_string()
}

fn default_min_pin_length() -> usize {
    4
}

fn default_notify_timeout() -> u64 {
    5
}
