// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-commit change feed.
//!
//! A broadcast channel of dirty signals. Events carry only which table
//! changed and for which conversation; subscribers re-fetch through the
//! normal read paths instead of reconstructing state from event payloads.
//! Slow subscribers lose events (broadcast lag), which is safe for a
//! refresh-hint channel.

use chatdesk_core::{ChangeEvent, ChangeTable};
use tokio::sync::broadcast;
use tracing::trace;

const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Publish a dirty signal. No subscribers is not an error.
    pub fn publish(&self, table: ChangeTable, conversation_id: &str) {
        let event = ChangeEvent {
            table,
            conversation_id: conversation_id.to_string(),
        };
        trace!(?event, "change event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(ChangeTable::Messages, "c1");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.table, ChangeTable::Messages);
        assert_eq!(event.conversation_id, "c1");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let feed = ChangeFeed::new();
        feed.publish(ChangeTable::Conversations, "c1");
    }
}
