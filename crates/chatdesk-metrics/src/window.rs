// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting window resolution.

use chatdesk_core::ChatdeskError;
use chrono::{DateTime, Duration, Timelike, Utc};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A reporting range request. `Today` starts at UTC midnight; the rolling
/// ranges end at "now"; `Custom` carries explicit inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsRange {
    Today,
    Last7Days,
    Last30Days,
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl MetricsRange {
    /// Parse the wire form: `today`, `7d`, `30d`, or `custom` with ISO-8601
    /// `start`/`end`.
    pub fn parse(
        range: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, ChatdeskError> {
        match range {
            "today" => Ok(MetricsRange::Today),
            "7d" => Ok(MetricsRange::Last7Days),
            "30d" => Ok(MetricsRange::Last30Days),
            "custom" => {
                let (Some(start), Some(end)) = (start, end) else {
                    return Err(ChatdeskError::Invalid(
                        "custom range requires ISO start and end".to_string(),
                    ));
                };
                let start = parse_iso(start)?;
                let end = parse_iso(end)?;
                if end < start {
                    return Err(ChatdeskError::Invalid(
                        "custom range end precedes start".to_string(),
                    ));
                }
                Ok(MetricsRange::Custom { start, end })
            }
            other => Err(ChatdeskError::Invalid(format!("invalid range: {other}"))),
        }
    }

    /// Resolve to concrete ISO bounds as stored in SQLite, relative to `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> (String, String) {
        let (start, end) = match self {
            MetricsRange::Today => (
                now.with_hour(0)
                    .and_then(|d| d.with_minute(0))
                    .and_then(|d| d.with_second(0))
                    .and_then(|d| d.with_nanosecond(0))
                    .unwrap_or(now),
                now,
            ),
            MetricsRange::Last7Days => (now - Duration::days(7), now),
            MetricsRange::Last30Days => (now - Duration::days(30), now),
            MetricsRange::Custom { start, end } => (*start, *end),
        };
        (
            start.format(ISO_FORMAT).to_string(),
            end.format(ISO_FORMAT).to_string(),
        )
    }
}

fn parse_iso(s: &str) -> Result<DateTime<Utc>, ChatdeskError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ChatdeskError::Invalid(format!("invalid ISO timestamp {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn today_starts_at_utc_midnight() {
        let now = at("2026-08-23T14:30:15.250Z");
        let (start, end) = MetricsRange::Today.resolve(now);
        assert_eq!(start, "2026-08-23T00:00:00.000Z");
        assert_eq!(end, "2026-08-23T14:30:15.250Z");
    }

    #[test]
    fn rolling_ranges_end_now() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let (start, end) = MetricsRange::Last7Days.resolve(now);
        assert_eq!(start, "2026-08-16T12:00:00.000Z");
        assert_eq!(end, "2026-08-23T12:00:00.000Z");

        let (start, _) = MetricsRange::Last30Days.resolve(now);
        assert_eq!(start, "2026-07-24T12:00:00.000Z");
    }

    #[test]
    fn custom_range_requires_both_bounds_in_order() {
        let ok = MetricsRange::parse(
            "custom",
            Some("2026-01-01T00:00:00Z"),
            Some("2026-02-01T00:00:00Z"),
        )
        .unwrap();
        assert!(matches!(ok, MetricsRange::Custom { .. }));

        assert!(MetricsRange::parse("custom", None, Some("2026-02-01T00:00:00Z")).is_err());
        assert!(
            MetricsRange::parse(
                "custom",
                Some("2026-02-01T00:00:00Z"),
                Some("2026-01-01T00:00:00Z"),
            )
            .is_err()
        );
    }

    #[test]
    fn unknown_range_is_rejected() {
        assert!(MetricsRange::parse("90d", None, None).is_err());
    }
}
