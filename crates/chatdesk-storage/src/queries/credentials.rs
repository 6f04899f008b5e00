// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login credential storage.
//!
//! Credentials live in their own table without a foreign key to profiles:
//! provisioning writes the credential first, the profile second, and the
//! compensating delete must run when the second step fails. Only Argon2 PIN
//! hashes are stored here; hashing itself happens in the service layer.

use chatdesk_core::ChatdeskError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, now_iso};

/// One staff login credential row.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: String,
    /// Synthetic login address: `<username>@<staff_domain>`.
    pub login_email: String,
    pub pin_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

fn credential_from_row(row: &rusqlite::Row<'_>) -> Result<Credential, rusqlite::Error> {
    Ok(Credential {
        user_id: row.get(0)?,
        login_email: row.get(1)?,
        pin_hash: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub async fn insert(db: &Database, credential: &Credential) -> Result<(), ChatdeskError> {
    let c = credential.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO staff_credentials (user_id, login_email, pin_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![c.user_id, c.login_email, c.pin_hash, c.created_at, c.updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_unique_login)
}

pub async fn get_by_login_email(
    db: &Database,
    login_email: &str,
) -> Result<Option<Credential>, ChatdeskError> {
    let login_email = login_email.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT user_id, login_email, pin_hash, created_at, updated_at
                 FROM staff_credentials WHERE login_email = ?1",
                params![login_email],
                credential_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace the PIN hash, e.g. on an admin-initiated reset.
pub async fn update_pin_hash(
    db: &Database,
    user_id: &str,
    pin_hash: &str,
) -> Result<(), ChatdeskError> {
    let user_id = user_id.to_string();
    let pin_hash = pin_hash.to_string();
    let now = now_iso();
    let n = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE staff_credentials SET pin_hash = ?1, updated_at = ?2 WHERE user_id = ?3",
                params![pin_hash, now, user_id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if n == 0 {
        return Err(ChatdeskError::NotFound {
            what: "staff credential".to_string(),
        });
    }
    Ok(())
}

/// Remove a credential. Returns whether a row was deleted; the provisioning
/// rollback path treats `false` as already-gone, not as failure.
pub async fn delete(db: &Database, user_id: &str) -> Result<bool, ChatdeskError> {
    let user_id = user_id.to_string();
    let n = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM staff_credentials WHERE user_id = ?1",
                params![user_id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(n > 0)
}

fn map_unique_login(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChatdeskError {
    if let tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(err, _)) = &e
        && err.code == rusqlite::ErrorCode::ConstraintViolation
    {
        return ChatdeskError::Conflict("login email already exists".to_string());
    }
    crate::database::map_tr_err(e)
}
