// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification events and their rendered card texts.

/// Maximum rendered length of a message snippet, in characters.
const SNIPPET_MAX: usize = 160;

/// Collapse whitespace and truncate to [`SNIPPET_MAX`] characters, appending
/// an ellipsis when cut. Customer text goes through this before it reaches
/// the webhook so multi-line messages render as one card line.
pub fn snippet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > SNIPPET_MAX {
        let mut cut: String = collapsed.chars().take(SNIPPET_MAX - 1).collect();
        cut.push('…');
        cut
    } else {
        collapsed
    }
}

/// A staff-facing notification. Carries pre-resolved display values; the
/// service layer looks up site and staff names before publishing.
#[derive(Debug, Clone)]
pub enum NotifyEvent {
    /// A customer opened a new conversation.
    NewConversation {
        site_name: String,
        customer_name: String,
        first_message: String,
        conversation_id: String,
    },
    /// A customer posted a follow-up message.
    NewCustomerMessage {
        site_name: String,
        customer_name: String,
        message: String,
        conversation_id: String,
    },
    /// A staff member claimed a conversation.
    Claimed {
        site_name: String,
        claimed_by: String,
        customer_name: String,
        conversation_id: String,
    },
    /// A conversation was closed.
    Closed {
        site_name: String,
        closed_by: String,
        customer_name: String,
        conversation_id: String,
    },
}

impl NotifyEvent {
    pub fn conversation_id(&self) -> &str {
        match self {
            NotifyEvent::NewConversation { conversation_id, .. }
            | NotifyEvent::NewCustomerMessage { conversation_id, .. }
            | NotifyEvent::Claimed { conversation_id, .. }
            | NotifyEvent::Closed { conversation_id, .. } => conversation_id,
        }
    }

    /// Render the markdown card text. When `app_base_url` is set, a deep link
    /// to the staff chat view is appended.
    pub fn render(&self, app_base_url: Option<&str>) -> String {
        let link = app_base_url
            .map(|base| format!("{}/chat/{}", base.trim_end_matches('/'), self.conversation_id()))
            .unwrap_or_default();
        match self {
            NotifyEvent::NewConversation {
                site_name,
                customer_name,
                first_message,
                ..
            } => format!(
                "**New Live Chat — {site_name}**\n\n**From:** {customer_name}\n\n**Message:** {}\n\n{link}",
                snippet(first_message)
            ),
            NotifyEvent::NewCustomerMessage {
                site_name,
                customer_name,
                message,
                ..
            } => format!(
                "**New message — {site_name}**\n\n**From:** {customer_name}\n\n**Message:** {}\n\n{link}",
                snippet(message)
            ),
            NotifyEvent::Claimed {
                site_name,
                claimed_by,
                customer_name,
                ..
            } => format!(
                "✅ **Claimed — {site_name}**\n\n**By:** {claimed_by}\n\n**Customer:** {customer_name}\n\n{link}"
            ),
            NotifyEvent::Closed {
                site_name,
                closed_by,
                customer_name,
                ..
            } => format!(
                "🔒 **Chat closed — {site_name}**\n\n**By:** {closed_by}\n\n**Customer:** {customer_name}\n\n{link}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_collapses_whitespace() {
        assert_eq!(snippet("  hello\n\n  world\t again "), "hello world again");
    }

    #[test]
    fn snippet_truncates_long_text_with_ellipsis() {
        let long = "x".repeat(500);
        let s = snippet(&long);
        assert_eq!(s.chars().count(), 160);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn snippet_leaves_short_text_alone() {
        let short = "a".repeat(160);
        assert_eq!(snippet(&short), short);
    }

    #[test]
    fn new_conversation_card_includes_link_when_base_url_set() {
        let event = NotifyEvent::NewConversation {
            site_name: "Duke's".to_string(),
            customer_name: "Sam".to_string(),
            first_message: "table for two?".to_string(),
            conversation_id: "c1".to_string(),
        };
        let text = event.render(Some("https://crm.example.com/"));
        assert!(text.starts_with("**New Live Chat — Duke's**"));
        assert!(text.contains("**From:** Sam"));
        assert!(text.contains("**Message:** table for two?"));
        assert!(text.ends_with("https://crm.example.com/chat/c1"));
    }

    #[test]
    fn claimed_and_closed_cards() {
        let claimed = NotifyEvent::Claimed {
            site_name: "Duke's".to_string(),
            claimed_by: "Ash".to_string(),
            customer_name: "Sam".to_string(),
            conversation_id: "c1".to_string(),
        };
        assert!(claimed.render(None).starts_with("✅ **Claimed — Duke's**"));

        let closed = NotifyEvent::Closed {
            site_name: "Duke's".to_string(),
            closed_by: "Ash".to_string(),
            customer_name: "Sam".to_string(),
            conversation_id: "c1".to_string(),
        };
        let text = closed.render(None);
        assert!(text.starts_with("🔒 **Chat closed — Duke's**"));
        assert!(text.contains("**By:** Ash"));
    }
}
