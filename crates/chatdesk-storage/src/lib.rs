// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Chatdesk backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed query operations for
//! conversations, messages, staff, credentials, sessions, and canned replies.
//!
//! The claim protocol lives in [`queries::conversations::claim`]: a single
//! conditional UPDATE inside one transaction, never a read-then-write pair.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{now_iso, Database};
pub use models::*;
