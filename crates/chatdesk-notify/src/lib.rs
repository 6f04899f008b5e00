// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook notification side-channel.
//!
//! Posts short markdown cards to a configured webhook (Teams-style
//! `{"text": ...}` payload) when conversations are opened, receive customer
//! messages, are claimed, or are closed. Delivery is strictly best-effort:
//! failures are logged and swallowed, and the triggering operation has
//! already committed before any notification is attempted.

pub mod event;
pub mod notifier;

pub use event::{NotifyEvent, snippet};
pub use notifier::Notifier;
