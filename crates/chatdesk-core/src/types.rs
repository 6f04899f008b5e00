// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Chatdesk workspace.
//!
//! Timestamps are ISO-8601 UTC strings (`%Y-%m-%dT%H:%M:%fZ`), matching the
//! storage layer's SQLite representation. Arithmetic over timestamps happens
//! in `chatdesk-metrics`, which parses them with chrono.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Body prefix marking a synthetic system notice embedded in the thread,
/// e.g. an admin take-over annotation.
pub const SYSTEM_NOTICE_PREFIX: &str = "SYSTEM: ";

/// Staff role, in increasing order of authority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    Manager,
    Admin,
}

/// Conversation lifecycle status. Transitions are one-way: open -> closed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Closed,
}

/// Who authored a message. System notices are staff-sent messages whose body
/// carries [`SYSTEM_NOTICE_PREFIX`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Customer,
    Staff,
}

/// A support conversation. The row is the single shared mutable resource per
/// chat; the only safe mutation pattern for `assigned_to` and `status` is a
/// conditional update at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub site_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: ConversationStatus,
    /// Current assignee. Null or exactly one staff user id.
    pub assigned_to: Option<String>,
    /// Unguessable per-conversation token for unauthenticated customer access.
    /// Never serialized into staff-facing responses.
    #[serde(skip_serializing)]
    pub customer_token: String,
    pub created_at: String,
    pub last_message_at: String,
    pub closed_at: Option<String>,
    /// Denormalized closer identity, kept for reporting even if the staff
    /// profile later changes.
    pub handled_by: Option<String>,
    pub handled_by_name: Option<String>,
}

/// A single message in a conversation thread. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_type: SenderType,
    /// Present only for staff-sent messages.
    pub sender_id: Option<String>,
    pub body: String,
    pub created_at: String,
}

impl Message {
    /// True for synthetic system notices (e.g. "admin took over") embedded in
    /// the thread for audit visibility.
    pub fn is_system_notice(&self) -> bool {
        self.sender_type == SenderType::Staff && self.body.starts_with(SYSTEM_NOTICE_PREFIX)
    }
}

/// A staff member's directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProfile {
    pub user_id: String,
    /// Globally unique login handle, normalized to trimmed lowercase.
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub site_id: Option<String>,
    pub is_active: bool,
    /// Override used when cross-referencing the external rota feed by name.
    pub rota_name: Option<String>,
    pub created_at: String,
}

/// A pre-written reply template staff can insert into a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedReply {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Manual ordering key; ties broken by title.
    pub sort_order: i64,
    pub is_active: bool,
    /// Null means the reply is global rather than site-scoped.
    pub site_id: Option<String>,
}

/// The identity context for one authenticated request.
///
/// Derived once per request from the session token and treated as immutable
/// for the duration of the call -- core operations never read ambient global
/// auth state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Result of a claim attempt. Losing the race is a normal outcome the caller
/// handles by refreshing state, not an error.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The caller is now the sole assignee; carries the updated row.
    Claimed(Conversation),
    /// Another staff member claimed first.
    AlreadyClaimed,
}

impl ClaimOutcome {
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed(_))
    }
}

/// Which table a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChangeTable {
    Conversations,
    Messages,
}

/// A dirty signal published after a write commits. Carries no row payload:
/// observers re-fetch instead of reconstructing state from events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_message(body: &str) -> Message {
        Message {
            id: "m1".to_string(),
            conversation_id: "c1".to_string(),
            sender_type: SenderType::Staff,
            sender_id: Some("u1".to_string()),
            body: body.to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn system_notice_detection() {
        assert!(staff_message("SYSTEM: Ash (admin) took over this chat").is_system_notice());
        assert!(!staff_message("hello, how can I help?").is_system_notice());

        let customer = Message {
            sender_type: SenderType::Customer,
            sender_id: None,
            ..staff_message("SYSTEM: spoofed")
        };
        assert!(!customer.is_system_notice(), "customer messages are never system notices");
    }

    #[test]
    fn customer_token_is_not_serialized() {
        let convo = Conversation {
            id: "c1".to_string(),
            site_id: "duke".to_string(),
            customer_name: "Sam".to_string(),
            customer_email: None,
            status: ConversationStatus::Open,
            assigned_to: None,
            customer_token: "secret-token".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            last_message_at: "2026-01-01T00:00:00.000Z".to_string(),
            closed_at: None,
            handled_by: None,
            handled_by_name: None,
        };
        let json = serde_json::to_string(&convo).unwrap();
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn claim_outcome_predicate() {
        assert!(!ClaimOutcome::AlreadyClaimed.is_claimed());
    }
}
