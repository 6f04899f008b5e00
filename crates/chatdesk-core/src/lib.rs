// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chatdesk live-chat CRM backend.
//!
//! This crate provides the domain model (conversations, messages, staff
//! profiles, canned replies), the shared error taxonomy, and the pure
//! lifecycle-guard predicates that every authoritative writer re-evaluates
//! before mutating a conversation.

pub mod error;
pub mod guard;
pub mod rota;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ChatdeskError;
pub use types::{
    ActorContext, CannedReply, ChangeEvent, ChangeTable, ClaimOutcome, Conversation, Message,
    Role, SenderType, StaffProfile, ConversationStatus, SYSTEM_NOTICE_PREFIX,
};
