//! Persistent records: tenants, meetings, transcript segments.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A tenant principal, resolved from an API token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tenant {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Meeting lifecycle. Transitions are one-way:
/// `requested → active → {ended, failed}`; skipping forward is allowed
/// (a launch failure ends a meeting that never went active), regressing
/// never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Requested,
    Active,
    Ended,
    Failed,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Requested => "requested",
            MeetingStatus::Active => "active",
            MeetingStatus::Ended => "ended",
            MeetingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(MeetingStatus::Requested),
            "active" => Some(MeetingStatus::Active),
            "ended" => Some(MeetingStatus::Ended),
            "failed" => Some(MeetingStatus::Failed),
            _ => None,
        }
    }

    /// Statuses a row may be in for a transition INTO `self` to be legal.
    pub fn allowed_from(&self) -> &'static [&'static str] {
        match self {
            MeetingStatus::Requested => &[],
            MeetingStatus::Active => &["requested"],
            MeetingStatus::Ended => &["requested", "active"],
            MeetingStatus::Failed => &["requested", "active"],
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Meeting {
    pub id: i64,
    pub user_id: i64,
    pub platform: String,
    /// Native meeting id extracted from the URL by the canonicalizer.
    pub platform_specific_id: String,
    pub meeting_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    pub fn status(&self) -> Option<MeetingStatus> {
        MeetingStatus::parse(&self.status)
    }
}

/// A durable transcript segment. Never modified after insert; the
/// `(meeting_id, start_time, end_time)` triple is unique in the store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TranscriptSegment {
    pub id: i64,
    pub meeting_id: i64,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in [
            MeetingStatus::Requested,
            MeetingStatus::Active,
            MeetingStatus::Ended,
            MeetingStatus::Failed,
        ] {
            assert_eq!(MeetingStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(MeetingStatus::parse("cancelled"), None);
    }

    #[test]
    fn transitions_never_regress() {
        // Nothing transitions into `requested`.
        assert!(MeetingStatus::Requested.allowed_from().is_empty());
        // Terminal states are not a source for anything.
        for target in [
            MeetingStatus::Active,
            MeetingStatus::Ended,
            MeetingStatus::Failed,
        ] {
            assert!(!target.allowed_from().contains(&"ended"));
            assert!(!target.allowed_from().contains(&"failed"));
        }
    }

    #[test]
    fn launch_failure_can_fail_a_requested_meeting() {
        assert!(MeetingStatus::Failed.allowed_from().contains(&"requested"));
        assert!(MeetingStatus::Ended.allowed_from().contains(&"requested"));
    }
}
