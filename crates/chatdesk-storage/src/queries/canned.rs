// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned reply templates.

use chatdesk_core::ChatdeskError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::models::CannedReply;

fn reply_from_row(row: &rusqlite::Row<'_>) -> Result<CannedReply, rusqlite::Error> {
    Ok(CannedReply {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        sort_order: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        site_id: row.get(5)?,
    })
}

const REPLY_COLUMNS: &str = "id, title, body, sort_order, is_active, site_id";

/// Active replies visible in the composer for one site: global templates plus
/// the site's own, in manual order with title as tiebreak.
pub async fn list_active(
    db: &Database,
    site_id: Option<&str>,
) -> Result<Vec<CannedReply>, ChatdeskError> {
    let site_id = site_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPLY_COLUMNS} FROM canned_replies
                 WHERE is_active = 1 AND (site_id IS NULL OR ?1 IS NULL OR site_id = ?1)
                 ORDER BY sort_order ASC, title COLLATE NOCASE ASC"
            ))?;
            let rows = stmt.query_map(params![site_id], reply_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every reply including deactivated ones. Admin management view.
pub async fn list_all(db: &Database) -> Result<Vec<CannedReply>, ChatdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPLY_COLUMNS} FROM canned_replies
                 ORDER BY sort_order ASC, title COLLATE NOCASE ASC"
            ))?;
            let rows = stmt.query_map([], reply_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn create(
    db: &Database,
    title: &str,
    body: &str,
    sort_order: i64,
    site_id: Option<&str>,
) -> Result<CannedReply, ChatdeskError> {
    let reply = CannedReply {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        body: body.to_string(),
        sort_order,
        is_active: true,
        site_id: site_id.map(str::to_string),
    };
    let r = reply.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO canned_replies (id, title, body, sort_order, is_active, site_id)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5)",
                params![r.id, r.title, r.body, r.sort_order, r.site_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(reply)
}

pub async fn update(db: &Database, reply: &CannedReply) -> Result<(), ChatdeskError> {
    let r = reply.clone();
    let n = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE canned_replies
                 SET title = ?1, body = ?2, sort_order = ?3, is_active = ?4, site_id = ?5
                 WHERE id = ?6",
                params![r.title, r.body, r.sort_order, r.is_active as i64, r.site_id, r.id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if n == 0 {
        return Err(ChatdeskError::NotFound {
            what: "canned reply".to_string(),
        });
    }
    Ok(())
}

pub async fn delete(db: &Database, id: &str) -> Result<(), ChatdeskError> {
    let id = id.to_string();
    let n = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM canned_replies WHERE id = ?1", params![id]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if n == 0 {
        return Err(ChatdeskError::NotFound {
            what: "canned reply".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn list_active_merges_global_and_site_scoped() {
        let (db, _dir) = setup_db().await;
        create(&db, "Opening hours", "We open at 5pm.", 1, None).await.unwrap();
        create(&db, "Duke menu", "Menu link: ...", 2, Some("duke")).await.unwrap();
        create(&db, "Slanj menu", "Menu link: ...", 2, Some("slanj")).await.unwrap();

        let duke = list_active(&db, Some("duke")).await.unwrap();
        let titles: Vec<_> = duke.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Opening hours", "Duke menu"]);

        // No site filter sees everything active.
        let all = list_active(&db, None).await.unwrap();
        assert_eq!(all.len(), 3);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn deactivated_replies_disappear_from_composer_view() {
        let (db, _dir) = setup_db().await;
        let mut reply = create(&db, "Old promo", "Expired.", 1, None).await.unwrap();
        reply.is_active = false;
        update(&db, &reply).await.unwrap();

        assert!(list_active(&db, None).await.unwrap().is_empty());
        assert_eq!(list_all(&db).await.unwrap().len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let (db, _dir) = setup_db().await;
        let ghost = CannedReply {
            id: "ghost".to_string(),
            title: "x".to_string(),
            body: "y".to_string(),
            sort_order: 0,
            is_active: true,
            site_id: None,
        };
        assert!(matches!(
            update(&db, &ghost).await.unwrap_err(),
            ChatdeskError::NotFound { .. }
        ));
        assert!(matches!(
            delete(&db, "ghost").await.unwrap_err(),
            ChatdeskError::NotFound { .. }
        ));
        db.close().await.unwrap();
    }
}
