// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events stream for the staff inbox.
//!
//! GET /v1/events emits one `change` event per committed write:
//!
//! ```text
//! event: change
//! data: {"table":"messages","conversation_id":"..."}
//! ```
//!
//! Events are dirty signals only. Clients re-fetch the affected thread or
//! inbox tab; a lagged subscriber misses nothing it cannot recover by
//! re-fetching.

use std::convert::Infallible;

use axum::extract::{Extension, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use chatdesk_core::{ActorContext, ChangeEvent};
use futures::stream::{self, Stream};
use tokio::sync::broadcast;
use tracing::warn;

use chatdesk_service::ChatService;

fn change_event(event: &ChangeEvent) -> Event {
    let data = serde_json::to_string(event)
        .unwrap_or_else(|_| r#"{"table":"conversations","conversation_id":""}"#.to_string());
    Event::default().event("change").data(data)
}

/// Subscribe the caller to the change feed.
pub async fn events(
    State(service): State<ChatService>,
    Extension(actor): Extension<ActorContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = service.change_feed().subscribe();
    let user_id = actor.user_id;

    let stream = stream::unfold(rx, move |mut rx| {
        let user_id = user_id.clone();
        async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((Ok::<_, Infallible>(change_event(&event)), rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(%user_id, skipped, "event stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
