// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chatdesk.toml` > `~/.config/chatdesk/chatdesk.toml`
//! > `/etc/chatdesk/chatdesk.toml` with environment variable overrides via the
//! `CHATDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChatdeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatdesk/chatdesk.toml` (system-wide)
/// 3. `~/.config/chatdesk/chatdesk.toml` (user XDG config)
/// 4. `./chatdesk.toml` (local directory)
/// 5. `CHATDESK_*` environment variables
pub fn load_config() -> Result<ChatdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ChatdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChatdeskConfig::default()))
        .merge(Toml::file("/etc/chatdesk/chatdesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("chatdesk/chatdesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("chatdesk.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CHATDESK_NOTIFY_WEBHOOK_URL` must map to
/// `notify.webhook_url`, not `notify.webhook.url`.
fn env_provider() -> Env {
    Env::prefixed("CHATDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("notify_", "notify.", 1);
        mapped.into()
    })
}
