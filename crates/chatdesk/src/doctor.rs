// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatdesk doctor` command implementation.
//!
//! Runs diagnostic checks against the local environment to surface
//! configuration and storage problems before `serve` hits them.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use chatdesk_config::ChatdeskConfig;
use chatdesk_core::ChatdeskError;
use chatdesk_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

/// Run the `chatdesk doctor` command.
pub async fn run_doctor(config: &ChatdeskConfig, plain: bool) -> Result<(), ChatdeskError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_sites(config),
        check_database(&config.storage.database_path, config.storage.wal_mode).await,
        check_webhook(config),
    ];

    println!();
    println!("  chatdesk doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line;

        match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    let symbol = "✓".green().to_string();
                    line = format!(
                        "    {symbol} {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                } else {
                    line = format!(
                        "    [OK]   {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    let symbol = "!".yellow().to_string();
                    line = format!(
                        "    {symbol} {:<20} {} ({duration_ms}ms)",
                        result.name,
                        result.message.yellow()
                    );
                } else {
                    line = format!(
                        "    [WARN] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    let symbol = "✗".red().to_string();
                    line = format!(
                        "    {symbol} {:<20} {} ({duration_ms}ms)",
                        result.name,
                        result.message.red()
                    );
                } else {
                    line = format!(
                        "    [FAIL] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
        }

        println!("{line}");
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }

    println!();

    Ok(())
}

/// Check at least one site is configured.
fn check_sites(config: &ChatdeskConfig) -> CheckResult {
    let start = Instant::now();
    if config.sites.is_empty() {
        CheckResult {
            name: "Sites".to_string(),
            status: CheckStatus::Fail,
            message: "no sites configured".to_string(),
            duration: start.elapsed(),
        }
    } else {
        CheckResult {
            name: "Sites".to_string(),
            status: CheckStatus::Pass,
            message: format!("{} configured", config.sites.len()),
            duration: start.elapsed(),
        }
    }
}

/// Check the database can be opened and migrated.
async fn check_database(db_path: &str, wal_mode: bool) -> CheckResult {
    let start = Instant::now();
    let path = std::path::Path::new(db_path);

    if !path.exists() {
        return CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Warn,
            message: format!("not found: {db_path} (will be created on first run)"),
            duration: start.elapsed(),
        };
    }

    match Database::open(db_path, wal_mode).await {
        Ok(db) => {
            let close = db.close().await;
            CheckResult {
                name: "Database".to_string(),
                status: if close.is_ok() {
                    CheckStatus::Pass
                } else {
                    CheckStatus::Warn
                },
                message: "connected, schema current".to_string(),
                duration: start.elapsed(),
            }
        }
        Err(e) => CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Fail,
            message: format!("open failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Check the webhook side-channel configuration.
fn check_webhook(config: &ChatdeskConfig) -> CheckResult {
    let start = Instant::now();
    match &config.notify.webhook_url {
        None => CheckResult {
            name: "Webhook".to_string(),
            status: CheckStatus::Warn,
            message: "not configured (notifications disabled)".to_string(),
            duration: start.elapsed(),
        },
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => CheckResult {
            name: "Webhook".to_string(),
            status: CheckStatus::Pass,
            message: "configured".to_string(),
            duration: start.elapsed(),
        },
        Some(url) => CheckResult {
            name: "Webhook".to_string(),
            status: CheckStatus::Fail,
            message: format!("invalid URL: {url}"),
            duration: start.elapsed(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_config::SiteConfig;

    #[test]
    fn empty_sites_fail_the_check() {
        let config = ChatdeskConfig::default();
        assert_eq!(check_sites(&config).status, CheckStatus::Fail);
    }

    #[test]
    fn webhook_scheme_is_validated() {
        let mut config = ChatdeskConfig::default();
        assert_eq!(check_webhook(&config).status, CheckStatus::Warn);

        config.notify.webhook_url = Some("https://chat.example.com/hook".to_string());
        assert_eq!(check_webhook(&config).status, CheckStatus::Pass);

        config.notify.webhook_url = Some("ftp://nope".to_string());
        assert_eq!(check_webhook(&config).status, CheckStatus::Fail);
    }

    #[tokio::test]
    async fn missing_database_is_a_warning() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.db");
        let result = check_database(path.to_str().unwrap(), true).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn sites_pass_when_configured() {
        let mut config = ChatdeskConfig::default();
        config.sites.push(SiteConfig {
            id: "downtown".to_string(),
            name: "Downtown".to_string(),
        });
        assert_eq!(check_sites(&config).status, CheckStatus::Pass);
    }
}
