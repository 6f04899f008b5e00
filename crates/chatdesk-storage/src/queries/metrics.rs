// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw window queries feeding the metrics aggregator.
//!
//! Two passes over `conversations`: rows CREATED in the window (claim volume
//! and first-reply latency) and rows CLOSED in the window (closure volume and
//! chat duration). Attribution uses `COALESCE(assigned_to, handled_by)` for
//! created rows, because closing releases the assignment, and `handled_by`
//! for closed rows. Timestamp arithmetic happens in `chatdesk-metrics`.

use chatdesk_core::ChatdeskError;
use rusqlite::params;

use crate::database::Database;

/// A conversation created inside the reporting window.
#[derive(Debug, Clone)]
pub struct CreatedConversationRow {
    pub conversation_id: String,
    pub created_at: String,
    /// Agent the conversation is attributed to, if any.
    pub agent_id: Option<String>,
    /// Timestamp of the earliest staff message in the thread.
    pub first_staff_reply_at: Option<String>,
}

/// A conversation closed inside the reporting window.
#[derive(Debug, Clone)]
pub struct ClosedConversationRow {
    pub conversation_id: String,
    pub created_at: String,
    pub closed_at: String,
    pub agent_id: Option<String>,
}

/// Conversations with `created_at` in `[start, end]`, with the earliest staff
/// reply resolved per row. Both filters are optional; the agent filter
/// matches the attribution column, not the live assignment.
pub async fn created_in_window(
    db: &Database,
    start: &str,
    end: &str,
    site_id: Option<&str>,
    agent_id: Option<&str>,
) -> Result<Vec<CreatedConversationRow>, ChatdeskError> {
    let start = start.to_string();
    let end = end.to_string();
    let site_id = site_id.map(str::to_string);
    let agent_id = agent_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.created_at,
                        COALESCE(c.assigned_to, c.handled_by),
                        (SELECT MIN(m.created_at) FROM messages m
                          WHERE m.conversation_id = c.id AND m.sender_type = 'staff')
                 FROM conversations c
                 WHERE c.created_at >= ?1 AND c.created_at <= ?2
                   AND (?3 IS NULL OR c.site_id = ?3)
                   AND (?4 IS NULL OR COALESCE(c.assigned_to, c.handled_by) = ?4)
                 ORDER BY c.created_at ASC",
            )?;
            let rows = stmt.query_map(params![start, end, site_id, agent_id], |row| {
                Ok(CreatedConversationRow {
                    conversation_id: row.get(0)?,
                    created_at: row.get(1)?,
                    agent_id: row.get(2)?,
                    first_staff_reply_at: row.get(3)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Closed conversations with `closed_at` in `[start, end]`.
pub async fn closed_in_window(
    db: &Database,
    start: &str,
    end: &str,
    site_id: Option<&str>,
    agent_id: Option<&str>,
) -> Result<Vec<ClosedConversationRow>, ChatdeskError> {
    let start = start.to_string();
    let end = end.to_string();
    let site_id = site_id.map(str::to_string);
    let agent_id = agent_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.created_at, c.closed_at, c.handled_by
                 FROM conversations c
                 WHERE c.status = 'closed' AND c.closed_at IS NOT NULL
                   AND c.closed_at >= ?1 AND c.closed_at <= ?2
                   AND (?3 IS NULL OR c.site_id = ?3)
                   AND (?4 IS NULL OR c.handled_by = ?4)
                 ORDER BY c.closed_at ASC",
            )?;
            let rows = stmt.query_map(params![start, end, site_id, agent_id], |row| {
                Ok(ClosedConversationRow {
                    conversation_id: row.get(0)?,
                    created_at: row.get(1)?,
                    closed_at: row.get(2)?,
                    agent_id: row.get(3)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorContext, Role};
    use crate::queries::conversations::{self, NewConversation};
    use crate::queries::messages;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn actor(user_id: &str) -> ActorContext {
        ActorContext {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            role: Role::Agent,
            is_active: true,
        }
    }

    async fn seed(db: &Database, site: &str) -> String {
        conversations::create(
            db,
            NewConversation {
                site_id: site.to_string(),
                customer_name: "Sam".to_string(),
                customer_email: None,
                first_message: "hello".to_string(),
            },
        )
        .await
        .unwrap()
        .0
        .id
    }

    const WIDE_START: &str = "2000-01-01T00:00:00.000Z";
    const WIDE_END: &str = "2100-01-01T00:00:00.000Z";

    #[tokio::test]
    async fn created_rows_carry_first_staff_reply_and_attribution() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "duke").await;
        conversations::claim(&db, &id, "staff-a").await.unwrap();
        messages::insert_staff_message(&db, &id, &actor("staff-a"), "hi there")
            .await
            .unwrap();

        let rows = created_in_window(&db, WIDE_START, WIDE_END, None, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].agent_id.as_deref(), Some("staff-a"));
        assert!(rows[0].first_staff_reply_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn closed_attribution_survives_assignment_release() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "duke").await;
        conversations::claim(&db, &id, "staff-a").await.unwrap();
        conversations::close(&db, &id, &actor("staff-a")).await.unwrap();

        // The close released assigned_to, but both passes still attribute
        // the conversation to the closer.
        let created = created_in_window(&db, WIDE_START, WIDE_END, None, Some("staff-a"))
            .await
            .unwrap();
        assert_eq!(created.len(), 1);

        let closed = closed_in_window(&db, WIDE_START, WIDE_END, None, Some("staff-a"))
            .await
            .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].agent_id.as_deref(), Some("staff-a"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn site_filter_and_window_bounds() {
        let (db, _dir) = setup_db().await;
        seed(&db, "duke").await;
        seed(&db, "slanj").await;

        let duke = created_in_window(&db, WIDE_START, WIDE_END, Some("duke"), None)
            .await
            .unwrap();
        assert_eq!(duke.len(), 1);

        // A window entirely in the past matches nothing.
        let none = created_in_window(
            &db,
            "2000-01-01T00:00:00.000Z",
            "2000-01-02T00:00:00.000Z",
            None,
            None,
        )
        .await
        .unwrap();
        assert!(none.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_closed_rows_are_excluded_from_closed_pass() {
        let (db, _dir) = setup_db().await;
        seed(&db, "duke").await;

        let closed = closed_in_window(&db, WIDE_START, WIDE_END, None, None)
            .await
            .unwrap();
        assert!(closed.is_empty());
        db.close().await.unwrap();
    }
}
