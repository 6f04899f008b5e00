// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message thread operations.
//!
//! Inserts re-verify the lifecycle guard inside the transaction: the customer
//! path proves possession of the conversation token, the staff path
//! re-evaluates [`chatdesk_core::guard::can_send`] against the current row.
//! Both bump `last_message_at` atomically with the insert.

use chatdesk_core::{ChatdeskError, guard};
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use crate::database::{Database, now_iso};
use crate::models::{ActorContext, Message};
use crate::queries::{CONVERSATION_COLUMNS, MESSAGE_COLUMNS, conversation_from_row, message_from_row};

enum InsertRow {
    Inserted(Message),
    Missing,
    Closed,
    BadToken,
    NotAllowed,
}

/// Full thread for one conversation, oldest first.
pub async fn list_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<Message>, ChatdeskError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id], message_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append a customer message. Requires the conversation token issued at
/// creation; a wrong token is indistinguishable from the caller's point of
/// view from knowing a real id without authorization.
pub async fn insert_customer_message(
    db: &Database,
    conversation_id: &str,
    customer_token: &str,
    body: &str,
) -> Result<Message, ChatdeskError> {
    let id = conversation_id.to_string();
    let token = customer_token.to_string();
    let body = body.to_string();
    let message_id = Uuid::new_v4().to_string();
    let now = now_iso();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let state: Option<(String, String)> = tx
                .query_row(
                    "SELECT status, customer_token FROM conversations WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let outcome = match state {
                None => InsertRow::Missing,
                Some((_, actual_token)) if actual_token != token => InsertRow::BadToken,
                Some((status, _)) if status == "closed" => InsertRow::Closed,
                Some(_) => {
                    tx.execute(
                        "INSERT INTO messages (id, conversation_id, sender_type, sender_id, body, created_at)
                         VALUES (?1, ?2, 'customer', NULL, ?3, ?4)",
                        params![message_id, id, body, now],
                    )?;
                    tx.execute(
                        "UPDATE conversations SET last_message_at = ?1 WHERE id = ?2",
                        params![now, id],
                    )?;
                    let message = tx.query_row(
                        &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                        params![message_id],
                        message_from_row,
                    )?;
                    InsertRow::Inserted(message)
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    map_insert(outcome)
}

/// Append a staff message. The send guard runs against the row state inside
/// this transaction, so a concurrent claim or close between the client's view
/// and this write is caught here. Replying does not claim the conversation.
pub async fn insert_staff_message(
    db: &Database,
    conversation_id: &str,
    actor: &ActorContext,
    body: &str,
) -> Result<Message, ChatdeskError> {
    let id = conversation_id.to_string();
    let actor = actor.clone();
    let body = body.to_string();
    let message_id = Uuid::new_v4().to_string();
    let now = now_iso();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let convo = tx
                .query_row(
                    &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                    params![id],
                    conversation_from_row,
                )
                .optional()?;
            let outcome = match convo {
                None => InsertRow::Missing,
                Some(convo) if !guard::can_send(&convo, &actor) => {
                    if convo.status == crate::models::ConversationStatus::Closed {
                        InsertRow::Closed
                    } else {
                        InsertRow::NotAllowed
                    }
                }
                Some(_) => {
                    tx.execute(
                        "INSERT INTO messages (id, conversation_id, sender_type, sender_id, body, created_at)
                         VALUES (?1, ?2, 'staff', ?3, ?4, ?5)",
                        params![message_id, id, actor.user_id, body, now],
                    )?;
                    tx.execute(
                        "UPDATE conversations SET last_message_at = ?1 WHERE id = ?2",
                        params![now, id],
                    )?;
                    let message = tx.query_row(
                        &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                        params![message_id],
                        message_from_row,
                    )?;
                    InsertRow::Inserted(message)
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    map_insert(outcome)
}

fn map_insert(outcome: InsertRow) -> Result<Message, ChatdeskError> {
    match outcome {
        InsertRow::Inserted(message) => Ok(message),
        InsertRow::Missing => Err(ChatdeskError::NotFound {
            what: "conversation".to_string(),
        }),
        InsertRow::Closed => Err(ChatdeskError::Conflict(
            "conversation is closed".to_string(),
        )),
        InsertRow::BadToken => Err(ChatdeskError::Unauthorized(
            "invalid conversation token".to_string(),
        )),
        InsertRow::NotAllowed => Err(ChatdeskError::Forbidden(
            "conversation is assigned to another staff member".to_string(),
        )),
    }
}
