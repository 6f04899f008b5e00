// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle operations: create, claim, close, reassign.
//!
//! Assignment and status mutations are conditional UPDATEs executed inside a
//! single transaction. When the condition matches zero rows, the same
//! transaction re-reads the row to diagnose why, so the caller gets a precise
//! outcome instead of a stale guess.

use chatdesk_core::{ChatdeskError, SYSTEM_NOTICE_PREFIX};
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use crate::database::{Database, now_iso};
use crate::models::{ActorContext, ClaimOutcome, Conversation, Message};
use crate::queries::{CONVERSATION_COLUMNS, conversation_from_row, message_from_row};

/// Input for opening a new conversation from the public widget.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub site_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub first_message: String,
}

/// Which inbox view to list.
#[derive(Debug, Clone)]
pub enum InboxTab {
    /// Open and unassigned, newest activity first.
    Unassigned,
    /// Open and assigned to the given staff user.
    Mine(String),
    /// All open conversations, unassigned first. Admin live board view.
    AllOpen,
    /// Recently closed, newest close first.
    Closed,
}

/// Per-tab conversation counts for the inbox header.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InboxCounts {
    pub unassigned: i64,
    pub mine: i64,
    pub closed: i64,
}

// Internal transaction outcomes. Domain-error mapping happens after the
// closure returns so rusqlite::Error stays the only error type inside it.
enum ClaimRow {
    Claimed(Conversation),
    AlreadyClaimed,
    Closed,
    Missing,
}

enum CloseRow {
    Closed(Conversation),
    AlreadyClosed,
    AssignedToOther,
    Missing,
}

enum ReassignRow {
    Updated(Conversation),
    Closed,
    Missing,
}

fn fetch_conversation_tx(
    tx: &rusqlite::Transaction<'_>,
    id: &str,
) -> Result<Option<Conversation>, rusqlite::Error> {
    tx.query_row(
        &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
        params![id],
        conversation_from_row,
    )
    .optional()
}

/// Open a new conversation with its first customer message, in one
/// transaction. Returns the created row and message.
pub async fn create(
    db: &Database,
    input: NewConversation,
) -> Result<(Conversation, Message), ChatdeskError> {
    let now = now_iso();
    let conversation_id = Uuid::new_v4().to_string();
    let customer_token = Uuid::new_v4().to_string();
    let message_id = Uuid::new_v4().to_string();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO conversations
                     (id, site_id, customer_name, customer_email, status, assigned_to,
                      customer_token, created_at, last_message_at)
                 VALUES (?1, ?2, ?3, ?4, 'open', NULL, ?5, ?6, ?6)",
                params![
                    conversation_id,
                    input.site_id,
                    input.customer_name,
                    input.customer_email,
                    customer_token,
                    now
                ],
            )?;
            tx.execute(
                "INSERT INTO messages (id, conversation_id, sender_type, sender_id, body, created_at)
                 VALUES (?1, ?2, 'customer', NULL, ?3, ?4)",
                params![message_id, conversation_id, input.first_message, now],
            )?;
            let conversation = tx.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![conversation_id],
                conversation_from_row,
            )?;
            let message = tx.query_row(
                &format!("SELECT {} FROM messages WHERE id = ?1", crate::queries::MESSAGE_COLUMNS),
                params![message_id],
                message_from_row,
            )?;
            tx.commit()?;
            Ok((conversation, message))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a conversation by id. The returned row includes the customer token;
/// callers on the public path compare it before exposing anything.
pub async fn get(db: &Database, id: &str) -> Result<Option<Conversation>, ChatdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                conversation_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List conversations for one inbox tab. Closed is capped to the most recent
/// 200 rows; the metrics module covers anything older.
pub async fn list_inbox(db: &Database, tab: InboxTab) -> Result<Vec<Conversation>, ChatdeskError> {
    db.connection()
        .call(move |conn| {
            let (sql, owner): (String, Option<String>) = match tab {
                InboxTab::Unassigned => (
                    format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE status = 'open' AND assigned_to IS NULL
                         ORDER BY last_message_at DESC"
                    ),
                    None,
                ),
                InboxTab::Mine(user_id) => (
                    format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE status = 'open' AND assigned_to = ?1
                         ORDER BY last_message_at DESC"
                    ),
                    Some(user_id),
                ),
                InboxTab::AllOpen => (
                    format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE status = 'open'
                         ORDER BY (assigned_to IS NULL) DESC, last_message_at DESC"
                    ),
                    None,
                ),
                InboxTab::Closed => (
                    format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE status = 'closed'
                         ORDER BY closed_at DESC
                         LIMIT 200"
                    ),
                    None,
                ),
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = match owner {
                Some(owner) => stmt.query_map(params![owner], conversation_from_row)?,
                None => stmt.query_map([], conversation_from_row)?,
            };
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Tab counts for the inbox header badges.
pub async fn counts(db: &Database, viewer_id: &str) -> Result<InboxCounts, ChatdeskError> {
    let viewer_id = viewer_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT
                     SUM(CASE WHEN status = 'open' AND assigned_to IS NULL THEN 1 ELSE 0 END),
                     SUM(CASE WHEN status = 'open' AND assigned_to = ?1 THEN 1 ELSE 0 END),
                     SUM(CASE WHEN status = 'closed' THEN 1 ELSE 0 END)
                 FROM conversations",
                params![viewer_id],
                |row| {
                    Ok(InboxCounts {
                        unassigned: row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                        mine: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                        closed: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attempt to claim an open, unassigned conversation for `staff_id`.
///
/// One conditional UPDATE decides the race: the condition requires the row to
/// still be open and unassigned, so of N concurrent claimers exactly one
/// matches a row. Losing is a normal [`ClaimOutcome::AlreadyClaimed`], not an
/// error; a closed or missing conversation is.
pub async fn claim(
    db: &Database,
    conversation_id: &str,
    staff_id: &str,
) -> Result<ClaimOutcome, ChatdeskError> {
    let id = conversation_id.to_string();
    let staff_id = staff_id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                "UPDATE conversations SET assigned_to = ?1
                 WHERE id = ?2 AND status = 'open' AND assigned_to IS NULL",
                params![staff_id, id],
            )?;
            let outcome = if n == 1 {
                match fetch_conversation_tx(&tx, &id)? {
                    Some(convo) => ClaimRow::Claimed(convo),
                    None => ClaimRow::Missing,
                }
            } else {
                // Zero rows matched: find out which condition failed.
                let state: Option<(String, Option<String>)> = tx
                    .query_row(
                        "SELECT status, assigned_to FROM conversations WHERE id = ?1",
                        params![id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                match state {
                    None => ClaimRow::Missing,
                    Some((status, _)) if status == "closed" => ClaimRow::Closed,
                    Some(_) => ClaimRow::AlreadyClaimed,
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        ClaimRow::Claimed(convo) => Ok(ClaimOutcome::Claimed(convo)),
        ClaimRow::AlreadyClaimed => Ok(ClaimOutcome::AlreadyClaimed),
        ClaimRow::Closed => Err(ChatdeskError::Conflict(
            "conversation is closed".to_string(),
        )),
        ClaimRow::Missing => Err(ChatdeskError::NotFound {
            what: "conversation".to_string(),
        }),
    }
}

/// Close a conversation the actor is allowed to close (unassigned, or
/// assigned to the actor). Records the closer's identity denormalized onto
/// the row and releases the assignment.
pub async fn close(
    db: &Database,
    conversation_id: &str,
    actor: &ActorContext,
) -> Result<Conversation, ChatdeskError> {
    let id = conversation_id.to_string();
    let actor_id = actor.user_id.clone();
    let actor_name = actor.display_name.clone();
    let now = now_iso();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                "UPDATE conversations
                 SET status = 'closed', closed_at = ?1, assigned_to = NULL,
                     handled_by = ?2, handled_by_name = ?3
                 WHERE id = ?4 AND status = 'open'
                   AND (assigned_to IS NULL OR assigned_to = ?2)",
                params![now, actor_id, actor_name, id],
            )?;
            let outcome = if n == 1 {
                match fetch_conversation_tx(&tx, &id)? {
                    Some(convo) => CloseRow::Closed(convo),
                    None => CloseRow::Missing,
                }
            } else {
                let state: Option<(String, Option<String>)> = tx
                    .query_row(
                        "SELECT status, assigned_to FROM conversations WHERE id = ?1",
                        params![id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                match state {
                    None => CloseRow::Missing,
                    Some((status, _)) if status == "closed" => CloseRow::AlreadyClosed,
                    Some(_) => CloseRow::AssignedToOther,
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        CloseRow::Closed(convo) => Ok(convo),
        CloseRow::AlreadyClosed => Err(ChatdeskError::Conflict(
            "conversation is already closed".to_string(),
        )),
        CloseRow::AssignedToOther => Err(ChatdeskError::Forbidden(
            "conversation is assigned to another staff member".to_string(),
        )),
        CloseRow::Missing => Err(ChatdeskError::NotFound {
            what: "conversation".to_string(),
        }),
    }
}

/// Reassign an open conversation to `target_staff_id`, overwriting any
/// current assignee. Role gating happens at the service layer; here the only
/// conditions are existence and openness.
pub async fn reassign(
    db: &Database,
    conversation_id: &str,
    target_staff_id: &str,
) -> Result<Conversation, ChatdeskError> {
    let id = conversation_id.to_string();
    let target = target_staff_id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                "UPDATE conversations SET assigned_to = ?1
                 WHERE id = ?2 AND status = 'open'",
                params![target, id],
            )?;
            let outcome = if n == 1 {
                match fetch_conversation_tx(&tx, &id)? {
                    Some(convo) => ReassignRow::Updated(convo),
                    None => ReassignRow::Missing,
                }
            } else {
                let status: Option<String> = tx
                    .query_row(
                        "SELECT status FROM conversations WHERE id = ?1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                match status {
                    None => ReassignRow::Missing,
                    Some(_) => ReassignRow::Closed,
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    map_reassign(outcome)
}

/// Reassign an open conversation to the acting admin/manager and append a
/// system notice to the thread, in one transaction. The notice makes the
/// take-over visible to the customer and auditable in the transcript.
pub async fn take_over(
    db: &Database,
    conversation_id: &str,
    actor: &ActorContext,
) -> Result<(Conversation, Message), ChatdeskError> {
    let id = conversation_id.to_string();
    let actor_id = actor.user_id.clone();
    let notice_body = format!(
        "{SYSTEM_NOTICE_PREFIX}{} ({}) took over this chat",
        actor.display_name, actor.role
    );
    let message_id = Uuid::new_v4().to_string();
    let now = now_iso();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                "UPDATE conversations SET assigned_to = ?1, last_message_at = ?2
                 WHERE id = ?3 AND status = 'open'",
                params![actor_id, now, id],
            )?;
            let outcome = if n == 1 {
                tx.execute(
                    "INSERT INTO messages (id, conversation_id, sender_type, sender_id, body, created_at)
                     VALUES (?1, ?2, 'staff', ?3, ?4, ?5)",
                    params![message_id, id, actor_id, notice_body, now],
                )?;
                let convo = fetch_conversation_tx(&tx, &id)?;
                let message = tx.query_row(
                    &format!(
                        "SELECT {} FROM messages WHERE id = ?1",
                        crate::queries::MESSAGE_COLUMNS
                    ),
                    params![message_id],
                    message_from_row,
                )?;
                match convo {
                    Some(convo) => TakeOverRow::Updated(convo, message),
                    None => TakeOverRow::Missing,
                }
            } else {
                let status: Option<String> = tx
                    .query_row(
                        "SELECT status FROM conversations WHERE id = ?1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                match status {
                    None => TakeOverRow::Missing,
                    Some(_) => TakeOverRow::Closed,
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        TakeOverRow::Updated(convo, message) => Ok((convo, message)),
        TakeOverRow::Closed => Err(ChatdeskError::Conflict(
            "conversation is closed".to_string(),
        )),
        TakeOverRow::Missing => Err(ChatdeskError::NotFound {
            what: "conversation".to_string(),
        }),
    }
}

enum TakeOverRow {
    Updated(Conversation, Message),
    Closed,
    Missing,
}

fn map_reassign(outcome: ReassignRow) -> Result<Conversation, ChatdeskError> {
    match outcome {
        ReassignRow::Updated(convo) => Ok(convo),
        ReassignRow::Closed => Err(ChatdeskError::Conflict(
            "conversation is closed".to_string(),
        )),
        ReassignRow::Missing => Err(ChatdeskError::NotFound {
            what: "conversation".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationStatus, Role};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn actor(user_id: &str, name: &str, role: Role) -> ActorContext {
        ActorContext {
            user_id: user_id.to_string(),
            display_name: name.to_string(),
            role,
            is_active: true,
        }
    }

    async fn seed_conversation(db: &Database) -> Conversation {
        let (convo, _msg) = create(
            db,
            NewConversation {
                site_id: "duke".to_string(),
                customer_name: "Sam".to_string(),
                customer_email: Some("sam@example.com".to_string()),
                first_message: "Hi, table for two tonight?".to_string(),
            },
        )
        .await
        .unwrap();
        convo
    }

    #[tokio::test]
    async fn create_opens_unassigned_with_first_message() {
        let (db, _dir) = setup_db().await;
        let (convo, msg) = create(
            &db,
            NewConversation {
                site_id: "duke".to_string(),
                customer_name: "Sam".to_string(),
                customer_email: None,
                first_message: "hello".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(convo.status, ConversationStatus::Open);
        assert!(convo.assigned_to.is_none());
        assert!(!convo.customer_token.is_empty());
        assert_eq!(convo.last_message_at, convo.created_at);
        assert_eq!(msg.conversation_id, convo.id);
        assert_eq!(msg.body, "hello");
        assert!(msg.sender_id.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_assigns_and_second_claim_loses() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;

        let first = claim(&db, &convo.id, "staff-a").await.unwrap();
        match first {
            ClaimOutcome::Claimed(c) => assert_eq!(c.assigned_to.as_deref(), Some("staff-a")),
            ClaimOutcome::AlreadyClaimed => panic!("first claim must win"),
        }

        let second = claim(&db, &convo.id, "staff-b").await.unwrap();
        assert!(!second.is_claimed());

        // The loser did not overwrite the winner.
        let row = get(&db, &convo.id).await.unwrap().unwrap();
        assert_eq!(row.assigned_to.as_deref(), Some("staff-a"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_claims_have_exactly_one_winner() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let db = db.clone();
            let id = convo.id.clone();
            handles.push(tokio::spawn(async move {
                claim(&db, &id, &format!("staff-{i}")).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.is_claimed() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "exactly one concurrent claimer may win");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_missing_conversation_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = claim(&db, "no-such-id", "staff-a").await.unwrap_err();
        assert!(matches!(err, ChatdeskError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_closed_conversation_is_conflict() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        close(&db, &convo.id, &actor("staff-a", "Ash", Role::Agent))
            .await
            .unwrap();

        let err = claim(&db, &convo.id, "staff-b").await.unwrap_err();
        assert!(matches!(err, ChatdeskError::Conflict(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_records_handler_and_releases_assignment() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        claim(&db, &convo.id, "staff-a").await.unwrap();

        let closed = close(&db, &convo.id, &actor("staff-a", "Ash", Role::Agent))
            .await
            .unwrap();
        assert_eq!(closed.status, ConversationStatus::Closed);
        assert!(closed.assigned_to.is_none());
        assert!(closed.closed_at.is_some());
        assert_eq!(closed.handled_by.as_deref(), Some("staff-a"));
        assert_eq!(closed.handled_by_name.as_deref(), Some("Ash"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_unassigned_is_allowed() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;

        let closed = close(&db, &convo.id, &actor("staff-a", "Ash", Role::Agent))
            .await
            .unwrap();
        assert_eq!(closed.status, ConversationStatus::Closed);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_assigned_to_other_is_forbidden() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        claim(&db, &convo.id, "staff-a").await.unwrap();

        let err = close(&db, &convo.id, &actor("staff-b", "Blake", Role::Agent))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatdeskError::Forbidden(_)));

        // Unchanged: still open, still assigned to the first claimer.
        let row = get(&db, &convo.id).await.unwrap().unwrap();
        assert_eq!(row.status, ConversationStatus::Open);
        assert_eq!(row.assigned_to.as_deref(), Some("staff-a"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_twice_is_conflict() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        let ash = actor("staff-a", "Ash", Role::Agent);
        close(&db, &convo.id, &ash).await.unwrap();

        let err = close(&db, &convo.id, &ash).await.unwrap_err();
        assert!(matches!(err, ChatdeskError::Conflict(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reassign_overwrites_current_assignee() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        claim(&db, &convo.id, "staff-a").await.unwrap();

        let updated = reassign(&db, &convo.id, "staff-b").await.unwrap();
        assert_eq!(updated.assigned_to.as_deref(), Some("staff-b"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reassign_closed_conversation_is_conflict() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        close(&db, &convo.id, &actor("staff-a", "Ash", Role::Agent))
            .await
            .unwrap();

        let err = reassign(&db, &convo.id, "staff-b").await.unwrap_err();
        assert!(matches!(err, ChatdeskError::Conflict(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn take_over_reassigns_and_appends_system_notice() {
        let (db, _dir) = setup_db().await;
        let convo = seed_conversation(&db).await;
        claim(&db, &convo.id, "staff-a").await.unwrap();

        let admin = actor("admin-1", "Morgan", Role::Admin);
        let (updated, notice) = take_over(&db, &convo.id, &admin).await.unwrap();
        assert_eq!(updated.assigned_to.as_deref(), Some("admin-1"));
        assert!(notice.is_system_notice());
        assert_eq!(notice.body, "SYSTEM: Morgan (admin) took over this chat");
        assert_eq!(updated.last_message_at, notice.created_at);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn inbox_tabs_and_counts() {
        let (db, _dir) = setup_db().await;
        let a = seed_conversation(&db).await;
        let b = seed_conversation(&db).await;
        let c = seed_conversation(&db).await;
        claim(&db, &b.id, "staff-a").await.unwrap();
        close(&db, &c.id, &actor("staff-a", "Ash", Role::Agent))
            .await
            .unwrap();

        let unassigned = list_inbox(&db, InboxTab::Unassigned).await.unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, a.id);

        let mine = list_inbox(&db, InboxTab::Mine("staff-a".to_string()))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, b.id);

        let all_open = list_inbox(&db, InboxTab::AllOpen).await.unwrap();
        assert_eq!(all_open.len(), 2);
        assert_eq!(all_open[0].id, a.id, "unassigned sorts first on the live board");

        let closed = list_inbox(&db, InboxTab::Closed).await.unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, c.id);

        let counts = counts(&db, "staff-a").await.unwrap();
        assert_eq!(counts.unassigned, 1);
        assert_eq!(counts.mine, 1);
        assert_eq!(counts.closed, 1);

        db.close().await.unwrap();
    }
}
