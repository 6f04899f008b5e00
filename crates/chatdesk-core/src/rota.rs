// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rota cross-referencing.
//!
//! The staff work schedule comes from an external scheduling feed that knows
//! people only by name. This module matches feed names to staff identities:
//! a profile's `rota_name` override wins, otherwise the display name is used.
//! Matching is case- and whitespace-insensitive.

use serde::{Deserialize, Serialize};

use crate::types::StaffProfile;

/// The result of matching one feed name against the staff directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotaMatch {
    pub feed_name: String,
    /// Matched staff user id, or None when no profile matches.
    pub user_id: Option<String>,
    pub display_name: Option<String>,
}

/// Normalize a person name for matching: trim, lowercase, collapse internal
/// whitespace runs to single spaces.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Match each feed name against the staff directory.
///
/// Inactive staff are still matched: the rota view shows scheduled shifts for
/// people who have since been deactivated. When several profiles normalize to
/// the same name, the first in directory order wins.
pub fn match_staff(feed_names: &[String], staff: &[StaffProfile]) -> Vec<RotaMatch> {
    feed_names
        .iter()
        .map(|feed_name| {
            let wanted = normalize_name(feed_name);
            let hit = staff.iter().find(|p| {
                let candidate = p.rota_name.as_deref().unwrap_or(&p.display_name);
                normalize_name(candidate) == wanted
            });
            RotaMatch {
                feed_name: feed_name.clone(),
                user_id: hit.map(|p| p.user_id.clone()),
                display_name: hit.map(|p| p.display_name.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn profile(user_id: &str, display_name: &str, rota_name: Option<&str>) -> StaffProfile {
        StaffProfile {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            display_name: display_name.to_string(),
            role: Role::Agent,
            site_id: None,
            is_active: true,
            rota_name: rota_name.map(str::to_string),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize_name("  Jamie   Mac Donald "), "jamie mac donald");
        assert_eq!(normalize_name("JAMIE"), "jamie");
    }

    #[test]
    fn matches_by_display_name() {
        let staff = vec![profile("u1", "Jamie MacDonald", None)];
        let matches = match_staff(&["jamie macdonald".to_string()], &staff);
        assert_eq!(matches[0].user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn rota_name_override_takes_precedence() {
        // The feed knows this person as "Jim M", not their display name.
        let staff = vec![profile("u1", "James Morton", Some("Jim M"))];

        let matches = match_staff(&["Jim M".to_string()], &staff);
        assert_eq!(matches[0].user_id.as_deref(), Some("u1"));

        // Once overridden, the display name no longer matches.
        let matches = match_staff(&["James Morton".to_string()], &staff);
        assert!(matches[0].user_id.is_none());
    }

    #[test]
    fn unmatched_names_yield_none() {
        let staff = vec![profile("u1", "Jamie", None)];
        let matches = match_staff(&["Nobody Known".to_string()], &staff);
        assert_eq!(matches[0].feed_name, "Nobody Known");
        assert!(matches[0].user_id.is_none());
    }
}
