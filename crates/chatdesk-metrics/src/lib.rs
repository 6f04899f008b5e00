// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting windows and per-agent aggregation.
//!
//! Pure computation over rows the storage layer already fetched: no SQL in
//! here. Two input passes, conversations created in the window and
//! conversations closed in the window, produce per-agent counts plus latency
//! and duration averages, and an overall summary.

pub mod aggregate;
pub mod window;

pub use aggregate::{
    AgentAggregate, ClosedConversation, CreatedConversation, OverallSummary, aggregate,
};
pub use window::MetricsRange;
