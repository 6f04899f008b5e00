// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle-guard predicates.
//!
//! Pure functions gating conversation mutations. Every authoritative writer
//! re-evaluates these inside its own transaction regardless of what the
//! client already checked -- the HTTP layer is a convenience, not a trust
//! boundary.

use crate::types::{ActorContext, Conversation, ConversationStatus, Role};

/// May `actor` append a staff message to `conversation`?
///
/// True iff the conversation is open and either unassigned or assigned to the
/// actor. Replying to an unassigned chat does NOT claim it.
pub fn can_send(conversation: &Conversation, actor: &ActorContext) -> bool {
    actor.is_active
        && conversation.status == ConversationStatus::Open
        && conversation
            .assigned_to
            .as_deref()
            .is_none_or(|assignee| assignee == actor.user_id)
}

/// May `actor` close `conversation`? Same rule as [`can_send`]: open, and
/// unassigned or owned by the actor.
pub fn can_close(conversation: &Conversation, actor: &ActorContext) -> bool {
    can_send(conversation, actor)
}

/// May `actor` overwrite a conversation's assignee?
pub fn can_reassign(actor: &ActorContext) -> bool {
    actor.is_active && matches!(actor.role, Role::Admin | Role::Manager)
}

/// May `actor` provision, deactivate, or reset credentials for staff, or view
/// metrics?
pub fn can_administer_staff(actor: &ActorContext) -> bool {
    actor.is_active && actor.role == Role::Admin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convo(status: ConversationStatus, assigned_to: Option<&str>) -> Conversation {
        Conversation {
            id: "c1".to_string(),
            site_id: "duke".to_string(),
            customer_name: "Sam".to_string(),
            customer_email: None,
            status,
            assigned_to: assigned_to.map(str::to_string),
            customer_token: "tok".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            last_message_at: "2026-01-01T00:00:00.000Z".to_string(),
            closed_at: None,
            handled_by: None,
            handled_by_name: None,
        }
    }

    fn actor(user_id: &str, role: Role, is_active: bool) -> ActorContext {
        ActorContext {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            role,
            is_active,
        }
    }

    #[test]
    fn unassigned_open_conversation_is_repliable_by_any_active_staff() {
        let c = convo(ConversationStatus::Open, None);
        assert!(can_send(&c, &actor("a", Role::Agent, true)));
        assert!(can_send(&c, &actor("b", Role::Manager, true)));
    }

    #[test]
    fn assignee_may_send_and_close_others_may_not() {
        let c = convo(ConversationStatus::Open, Some("owner"));
        let owner = actor("owner", Role::Agent, true);
        let other = actor("other", Role::Agent, true);

        assert!(can_send(&c, &owner));
        assert!(can_close(&c, &owner));
        assert!(!can_send(&c, &other));
        assert!(!can_close(&c, &other));
    }

    #[test]
    fn closed_conversation_never_passes_send_or_close() {
        // Guard consistency: never true once status is closed, for any actor.
        let unassigned = convo(ConversationStatus::Closed, None);
        let assigned = convo(ConversationStatus::Closed, Some("owner"));
        for a in [
            actor("owner", Role::Agent, true),
            actor("admin", Role::Admin, true),
        ] {
            assert!(!can_send(&unassigned, &a));
            assert!(!can_close(&unassigned, &a));
            assert!(!can_send(&assigned, &a));
            assert!(!can_close(&assigned, &a));
        }
    }

    #[test]
    fn inactive_staff_have_no_permissions() {
        let c = convo(ConversationStatus::Open, None);
        let inactive_admin = actor("x", Role::Admin, false);
        assert!(!can_send(&c, &inactive_admin));
        assert!(!can_reassign(&inactive_admin));
        assert!(!can_administer_staff(&inactive_admin));
    }

    #[test]
    fn reassign_requires_admin_or_manager() {
        assert!(can_reassign(&actor("m", Role::Manager, true)));
        assert!(can_reassign(&actor("a", Role::Admin, true)));
        assert!(!can_reassign(&actor("g", Role::Agent, true)));
    }

    #[test]
    fn staff_administration_is_admin_only() {
        assert!(can_administer_staff(&actor("a", Role::Admin, true)));
        assert!(!can_administer_staff(&actor("m", Role::Manager, true)));
        assert!(!can_administer_staff(&actor("g", Role::Agent, true)));
    }
}
