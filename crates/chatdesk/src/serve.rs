// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatdesk serve` command implementation.
//!
//! Opens the database, wires the webhook notifier and chat service, and
//! serves the HTTP API until interrupted. On shutdown the WAL is
//! checkpointed so the database file is complete on disk.

use chatdesk_config::ChatdeskConfig;
use chatdesk_core::ChatdeskError;
use chatdesk_notify::Notifier;
use chatdesk_service::ChatService;
use chatdesk_storage::Database;
use tracing::{error, info};

/// Run the `chatdesk serve` command.
pub async fn run_serve(config: ChatdeskConfig) -> Result<(), ChatdeskError> {
    init_tracing(&config.server.log_level);

    info!(
        sites = config.sites.len(),
        database = %config.storage.database_path,
        "starting chatdesk serve"
    );

    let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;

    let notifier = Notifier::new(
        config.notify.webhook_url.clone(),
        config.notify.app_base_url.clone(),
        config.notify.timeout_secs,
    )?;
    if config.notify.webhook_url.is_none() {
        info!("webhook notifications disabled (no notify.webhook_url configured)");
    }

    let service = ChatService::new(db.clone(), notifier, &config);

    let host = config.server.host.clone();
    let port = config.server.port;

    tokio::select! {
        result = chatdesk_gateway::start_server(&host, port, service) => {
            if let Err(e) = &result {
                error!(error = %e, "server exited with error");
            }
            db.close().await?;
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            db.close().await?;
            info!("chatdesk serve shutdown complete");
            Ok(())
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chatdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
