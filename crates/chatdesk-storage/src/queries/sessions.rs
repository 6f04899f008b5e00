// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session token storage.
//!
//! Tokens are 32 random bytes, hex-encoded, stored as opaque primary keys.
//! Resolving a token to an [`ActorContext`] joins the staff profile so the
//! role and active flag reflect the directory at request time, not at login.

use chatdesk_core::ChatdeskError;
use rand::RngCore;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, now_iso};
use crate::models::ActorContext;
use crate::queries::parse_enum;

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Create a session for `user_id` and return the new token.
pub async fn create(db: &Database, user_id: &str) -> Result<String, ChatdeskError> {
    let user_id = user_id.to_string();
    let token = generate_token();
    let stored = token.clone();
    let now = now_iso();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at, last_seen_at)
                 VALUES (?1, ?2, ?3, ?3)",
                params![stored, user_id, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(token)
}

/// Resolve a token to the acting staff identity, bumping `last_seen_at`.
///
/// Returns `None` for unknown tokens and for sessions whose profile row has
/// been removed. Deactivated staff still resolve, with `is_active = false`,
/// so the guards reject them with Forbidden rather than Unauthorized.
pub async fn actor_for_token(
    db: &Database,
    token: &str,
) -> Result<Option<ActorContext>, ChatdeskError> {
    let token = token.to_string();
    let now = now_iso();
    db.connection()
        .call(move |conn| {
            let actor = conn
                .query_row(
                    "SELECT p.user_id, p.display_name, p.role, p.is_active
                     FROM sessions s
                     JOIN staff_profiles p ON p.user_id = s.user_id
                     WHERE s.token = ?1",
                    params![token],
                    |row| {
                        let role: String = row.get(2)?;
                        Ok(ActorContext {
                            user_id: row.get(0)?,
                            display_name: row.get(1)?,
                            role: parse_enum(2, &role)?,
                            is_active: row.get::<_, i64>(3)? != 0,
                        })
                    },
                )
                .optional()?;
            if actor.is_some() {
                conn.execute(
                    "UPDATE sessions SET last_seen_at = ?1 WHERE token = ?2",
                    params![now, token],
                )?;
            }
            Ok(actor)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete one session (logout). Unknown tokens are a no-op.
pub async fn delete(db: &Database, token: &str) -> Result<(), ChatdeskError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Revoke every session for a user. Runs on deactivation.
pub async fn delete_for_user(db: &Database, user_id: &str) -> Result<usize, ChatdeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id]))
        .await
        .map_err(crate::database::map_tr_err)
}
