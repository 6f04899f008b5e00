// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort webhook delivery.

use std::time::Duration;

use chatdesk_core::ChatdeskError;
use serde::Serialize;
use tracing::{debug, error};

use crate::event::NotifyEvent;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts notification cards to the configured webhook.
///
/// An unconfigured notifier is valid and drops every event, so callers never
/// branch on whether notifications are enabled.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    app_base_url: Option<String>,
}

impl Notifier {
    pub fn new(
        webhook_url: Option<String>,
        app_base_url: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ChatdeskError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ChatdeskError::Notify {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            webhook_url,
            app_base_url,
        })
    }

    /// A notifier with no webhook configured. Every publish is a no-op.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: None,
            app_base_url: None,
        }
    }

    /// Deliver one event, logging and swallowing any failure. The caller's
    /// write has already committed; a dead webhook must never surface to the
    /// customer or staff request.
    pub async fn publish(&self, event: &NotifyEvent) {
        if let Err(e) = self.send(event).await {
            error!(
                conversation_id = event.conversation_id(),
                error = %e,
                "webhook notification failed"
            );
        }
    }

    async fn send(&self, event: &NotifyEvent) -> Result<(), ChatdeskError> {
        let Some(url) = &self.webhook_url else {
            debug!("no webhook configured, dropping notification");
            return Ok(());
        };

        let text = event.render(self.app_base_url.as_deref());
        let response = self
            .client
            .post(url)
            .json(&WebhookPayload { text: &text })
            .send()
            .await
            .map_err(|e| ChatdeskError::Notify {
                message: format!("webhook request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatdeskError::Notify {
                message: format!("webhook returned {status}: {body}"),
                source: None,
            });
        }

        debug!(conversation_id = event.conversation_id(), "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn claimed_event() -> NotifyEvent {
        NotifyEvent::Claimed {
            site_name: "Duke's".to_string(),
            claimed_by: "Ash".to_string(),
            customer_name: "Sam".to_string(),
            conversation_id: "c1".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_text_payload_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({
                "text": "✅ **Claimed — Duke's**\n\n**By:** Ash\n\n**Customer:** Sam\n\n"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::new(Some(format!("{}/hook", server.uri())), None, 5).unwrap();
        notifier.publish(&claimed_event()).await;
    }

    #[tokio::test]
    async fn webhook_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::new(Some(server.uri()), None, 5).unwrap();
        // Must not panic or propagate.
        notifier.publish(&claimed_event()).await;
    }

    #[tokio::test]
    async fn unconfigured_notifier_sends_nothing() {
        let notifier = Notifier::disabled();
        notifier.publish(&claimed_event()).await;
    }

    #[tokio::test]
    async fn unreachable_webhook_is_swallowed() {
        // Port 9 is discard; connection should fail fast.
        let notifier =
            Notifier::new(Some("http://127.0.0.1:9/hook".to_string()), None, 1).unwrap();
        notifier.publish(&claimed_event()).await;
    }
}
