// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-agent aggregation over one reporting window.

use std::collections::HashMap;

use chatdesk_core::StaffProfile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// A conversation created inside the window, as fetched by storage.
#[derive(Debug, Clone)]
pub struct CreatedConversation {
    pub agent_id: Option<String>,
    pub created_at: String,
    pub first_staff_reply_at: Option<String>,
}

/// A conversation closed inside the window.
#[derive(Debug, Clone)]
pub struct ClosedConversation {
    pub agent_id: Option<String>,
    pub created_at: String,
    pub closed_at: String,
}

/// One agent's scorecard for the window.
#[derive(Debug, Clone, Serialize)]
pub struct AgentAggregate {
    pub user_id: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub claimed_count: u64,
    pub closed_count: u64,
    /// Mean seconds from conversation creation to the first staff reply,
    /// over created-in-window conversations that got one. None if none did.
    pub avg_first_reply_seconds: Option<f64>,
    /// Mean minutes from creation to close, over closed-in-window rows.
    pub avg_chat_duration_minutes: Option<f64>,
}

/// Window totals, independent of attribution.
#[derive(Debug, Clone, Serialize)]
pub struct OverallSummary {
    pub created_conversations: u64,
    pub created_assigned: u64,
    pub created_unassigned: u64,
    pub closed_conversations: u64,
}

#[derive(Default)]
struct Acc {
    claimed_count: u64,
    closed_count: u64,
    first_reply_seconds: Vec<f64>,
    durations_minutes: Vec<f64>,
}

/// Aggregate both window passes into per-agent scorecards and an overall
/// summary. Unattributed conversations count only toward the summary. Clock
/// skew between rows clamps to zero rather than producing negative latency.
///
/// Agents sort by closed count descending, ties broken by display name,
/// case-insensitive.
pub fn aggregate(
    created: &[CreatedConversation],
    closed: &[ClosedConversation],
    profiles: &HashMap<String, StaffProfile>,
) -> (OverallSummary, Vec<AgentAggregate>) {
    let mut acc: HashMap<String, Acc> = HashMap::new();

    for c in created {
        let Some(agent_id) = &c.agent_id else {
            continue;
        };
        let entry = acc.entry(agent_id.clone()).or_default();
        entry.claimed_count += 1;
        if let Some(reply_at) = &c.first_staff_reply_at
            && let (Some(t0), Some(t1)) = (parse(&c.created_at), parse(reply_at))
        {
            let secs = (t1 - t0).num_milliseconds() as f64 / 1000.0;
            entry.first_reply_seconds.push(secs.max(0.0).floor());
        }
    }

    for c in closed {
        let Some(agent_id) = &c.agent_id else {
            continue;
        };
        let entry = acc.entry(agent_id.clone()).or_default();
        entry.closed_count += 1;
        if let (Some(t0), Some(t1)) = (parse(&c.created_at), parse(&c.closed_at)) {
            let mins = (t1 - t0).num_milliseconds() as f64 / 60_000.0;
            entry.durations_minutes.push(mins.max(0.0));
        }
    }

    let mut agents: Vec<AgentAggregate> = acc
        .into_iter()
        .map(|(user_id, a)| {
            let profile = profiles.get(&user_id);
            AgentAggregate {
                username: profile.map(|p| p.username.clone()),
                display_name: profile.map(|p| p.display_name.clone()),
                claimed_count: a.claimed_count,
                closed_count: a.closed_count,
                avg_first_reply_seconds: mean(&a.first_reply_seconds),
                avg_chat_duration_minutes: mean(&a.durations_minutes),
                user_id,
            }
        })
        .collect();

    agents.sort_by(|a, b| {
        b.closed_count
            .cmp(&a.closed_count)
            .then_with(|| sort_name(a).cmp(&sort_name(b)))
    });

    let overall = OverallSummary {
        created_conversations: created.len() as u64,
        created_assigned: created.iter().filter(|c| c.agent_id.is_some()).count() as u64,
        created_unassigned: created.iter().filter(|c| c.agent_id.is_none()).count() as u64,
        closed_conversations: closed.len() as u64,
    };

    (overall, agents)
}

fn sort_name(a: &AgentAggregate) -> String {
    a.display_name
        .as_deref()
        .or(a.username.as_deref())
        .unwrap_or(&a.user_id)
        .to_lowercase()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn parse(s: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(d) => Some(d.with_timezone(&Utc)),
        Err(e) => {
            warn!(timestamp = s, error = %e, "skipping unparseable timestamp");
            None
        }
    }
}
