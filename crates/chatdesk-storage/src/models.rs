// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `chatdesk-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use chatdesk_core::types::{
    ActorContext, CannedReply, ClaimOutcome, Conversation, ConversationStatus, Message, Role,
    SenderType, StaffProfile,
};
