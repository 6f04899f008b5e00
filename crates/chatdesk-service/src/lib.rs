// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration layer tying storage, notifications, and the change feed
//! together behind one [`ChatService`].
//!
//! Every operation follows the same shape: validate input, run the
//! authoritative storage transaction, then emit side effects (change events,
//! webhook cards) strictly after commit. Side effects never fail the
//! operation.

pub mod auth;
pub mod events;
pub mod service;

pub use events::ChangeFeed;
pub use service::ChatService;
