// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway built on axum.
//!
//! Three route groups: unauthenticated public widget endpoints under
//! `/public`, session-authenticated staff endpoints under `/v1`, and a
//! health probe. The HTTP layer translates between wire shapes and
//! [`chatdesk_service::ChatService`] calls; it enforces nothing the service
//! does not re-check.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, start_server};
