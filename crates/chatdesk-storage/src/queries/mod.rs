// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, one module per table family.
//!
//! Every function takes `&Database` and routes through the single writer
//! thread. Domain outcomes (claim lost, already closed, token mismatch) are
//! diagnosed inside the transaction and surfaced as enums or typed errors,
//! never by the caller re-reading state.

pub mod canned;
pub mod conversations;
pub mod credentials;
pub mod messages;
pub mod metrics;
pub mod sessions;
pub mod staff;

use std::str::FromStr;

use rusqlite::Row;

use crate::models::{Conversation, Message, SenderType, StaffProfile};

/// Column list matching [`conversation_from_row`]'s positional reads.
pub(crate) const CONVERSATION_COLUMNS: &str = "id, site_id, customer_name, customer_email, \
     status, assigned_to, customer_token, created_at, last_message_at, closed_at, \
     handled_by, handled_by_name";

/// Column list matching [`message_from_row`]'s positional reads.
pub(crate) const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_type, sender_id, body, created_at";

/// Column list matching [`staff_from_row`]'s positional reads.
pub(crate) const STAFF_COLUMNS: &str =
    "user_id, username, display_name, role, site_id, is_active, rota_name, created_at";

/// Parse a TEXT column into a strum-backed enum, reporting conversion
/// failures with the column index so they surface as storage corruption
/// rather than a panic.
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn conversation_from_row(row: &Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let status: String = row.get(4)?;
    Ok(Conversation {
        id: row.get(0)?,
        site_id: row.get(1)?,
        customer_name: row.get(2)?,
        customer_email: row.get(3)?,
        status: parse_enum(4, &status)?,
        assigned_to: row.get(5)?,
        customer_token: row.get(6)?,
        created_at: row.get(7)?,
        last_message_at: row.get(8)?,
        closed_at: row.get(9)?,
        handled_by: row.get(10)?,
        handled_by_name: row.get(11)?,
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> Result<Message, rusqlite::Error> {
    let sender_type: String = row.get(2)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_type: parse_enum::<SenderType>(2, &sender_type)?,
        sender_id: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn staff_from_row(row: &Row<'_>) -> Result<StaffProfile, rusqlite::Error> {
    let role: String = row.get(3)?;
    Ok(StaffProfile {
        user_id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        role: parse_enum(3, &role)?,
        site_id: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        rota_name: row.get(6)?,
        created_at: row.get(7)?,
    })
}
