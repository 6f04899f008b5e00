// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff directory queries.
//!
//! Profiles are never deleted, only deactivated, so closed-conversation
//! history and metrics keep resolving to a display name.

use chatdesk_core::ChatdeskError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, now_iso};
use crate::models::{Role, StaffProfile};
use crate::queries::{STAFF_COLUMNS, staff_from_row};

/// Insert a new staff profile. The username must already be normalized
/// (trimmed, lowercased) by the caller; UNIQUE enforcement happens here.
pub async fn insert_profile(db: &Database, profile: &StaffProfile) -> Result<(), ChatdeskError> {
    let p = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO staff_profiles
                     (user_id, username, display_name, role, site_id, is_active, rota_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    p.user_id,
                    p.username,
                    p.display_name,
                    p.role.to_string(),
                    p.site_id,
                    p.is_active as i64,
                    p.rota_name,
                    p.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_unique_username)
}

pub async fn get_profile(
    db: &Database,
    user_id: &str,
) -> Result<Option<StaffProfile>, ChatdeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {STAFF_COLUMNS} FROM staff_profiles WHERE user_id = ?1"),
                params![user_id],
                staff_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Directory listing, alphabetical by display name. `include_inactive` is the
/// admin view; the reassign picker passes false.
pub async fn list(
    db: &Database,
    include_inactive: bool,
) -> Result<Vec<StaffProfile>, ChatdeskError> {
    db.connection()
        .call(move |conn| {
            let sql = if include_inactive {
                format!(
                    "SELECT {STAFF_COLUMNS} FROM staff_profiles
                     ORDER BY display_name COLLATE NOCASE ASC"
                )
            } else {
                format!(
                    "SELECT {STAFF_COLUMNS} FROM staff_profiles WHERE is_active = 1
                     ORDER BY display_name COLLATE NOCASE ASC"
                )
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], staff_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_active(
    db: &Database,
    user_id: &str,
    is_active: bool,
) -> Result<(), ChatdeskError> {
    update_profile_field(db, user_id, move |conn, user_id| {
        conn.execute(
            "UPDATE staff_profiles SET is_active = ?1 WHERE user_id = ?2",
            params![is_active as i64, user_id],
        )
    })
    .await
}

pub async fn set_role(db: &Database, user_id: &str, role: Role) -> Result<(), ChatdeskError> {
    let role = role.to_string();
    update_profile_field(db, user_id, move |conn, user_id| {
        conn.execute(
            "UPDATE staff_profiles SET role = ?1 WHERE user_id = ?2",
            params![role, user_id],
        )
    })
    .await
}

/// Set or clear the rota-name override used when matching against the
/// external rota feed.
pub async fn set_rota_name(
    db: &Database,
    user_id: &str,
    rota_name: Option<String>,
) -> Result<(), ChatdeskError> {
    update_profile_field(db, user_id, move |conn, user_id| {
        conn.execute(
            "UPDATE staff_profiles SET rota_name = ?1 WHERE user_id = ?2",
            params![rota_name, user_id],
        )
    })
    .await
}

async fn update_profile_field<F>(db: &Database, user_id: &str, f: F) -> Result<(), ChatdeskError>
where
    F: FnOnce(&rusqlite::Connection, &str) -> Result<usize, rusqlite::Error> + Send + 'static,
{
    let user_id = user_id.to_string();
    let n = db
        .connection()
        .call(move |conn| f(conn, &user_id))
        .await
        .map_err(crate::database::map_tr_err)?;
    if n == 0 {
        return Err(ChatdeskError::NotFound {
            what: "staff profile".to_string(),
        });
    }
    Ok(())
}

fn map_unique_username(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChatdeskError {
    if let tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(err, _)) = &e
        && err.code == rusqlite::ErrorCode::ConstraintViolation
    {
        return ChatdeskError::Conflict("username already taken".to_string());
    }
    crate::database::map_tr_err(e)
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

    fn profile(user_id: &str, username: &str, name: &str) -> StaffProfile {
        StaffProfile {
            user_id: user_id.to_string(),
            username: username.to_string(),
            display_name: name.to_string(),
            role: Role::Agent,
            site_id: None,
            is_active: true,
            rota_name: None,
            created_at: now_iso(),
        }
    }

    #[tokio::test]
    async fn insert_and_lookup() {
        let (db, _dir) = setup_db().await;
        insert_profile(&db, &profile("u1", "ash", "Ash")).await.unwrap();

        let found = get_profile(&db, "u1").await.unwrap().unwrap();
        assert_eq!(found.username, "ash");
        assert_eq!(found.display_name, "Ash");

        assert!(get_profile(&db, "nobody").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let (db, _dir) = setup_db().await;
        insert_profile(&db, &profile("u1", "ash", "Ash")).await.unwrap();

        let err = insert_profile(&db, &profile("u2", "ash", "Other Ash"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatdeskError::Conflict(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_inactive_and_sorts_by_name() {
        let (db, _dir) = setup_db().await;
        insert_profile(&db, &profile("u1", "zoe", "zoe")).await.unwrap();
        insert_profile(&db, &profile("u2", "ash", "Ash")).await.unwrap();
        insert_profile(&db, &profile("u3", "mel", "Mel")).await.unwrap();
        set_active(&db, "u3", false).await.unwrap();

        let active = list(&db, false).await.unwrap();
        let names: Vec<_> = active.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ash", "zoe"], "case-insensitive sort, inactive hidden");

        let all = list(&db, true).await.unwrap();
        assert_eq!(all.len(), 3);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn role_and_rota_updates() {
        let (db, _dir) = setup_db().await;
        insert_profile(&db, &profile("u1", "ash", "Ash")).await.unwrap();

        set_role(&db, "u1", Role::Manager).await.unwrap();
        set_rota_name(&db, "u1", Some("ashley b".to_string())).await.unwrap();

        let p = get_profile(&db, "u1").await.unwrap().unwrap();
        assert_eq!(p.role, Role::Manager);
        assert_eq!(p.rota_name.as_deref(), Some("ashley b"));

        set_rota_name(&db, "u1", None).await.unwrap();
        let p = get_profile(&db, "u1").await.unwrap().unwrap();
        assert!(p.rota_name.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn updates_to_missing_profile_are_not_found() {
        let (db, _dir) = setup_db().await;
        let err = set_active(&db, "ghost", false).await.unwrap_err();
        assert!(matches!(err, ChatdeskError::NotFound { .. }));
        db.close().await.unwrap();
    }
}
