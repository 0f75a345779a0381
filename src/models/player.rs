use crate::models::grid::OccupancyGrid;
use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

/// The best match the tracker's player search returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMatch {
    pub id: String,
    pub name: String,
}

/// What the identity source knows about an external account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub name: String,
    pub online: bool,
    pub created: Option<NaiveDateTime>,
}

/// Aggregate presence derived from a session list. Total duration is a naive
/// sum; overlapping sessions double-count their shared span (see service
/// layer for the opt-in merged variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceStats {
    pub first_seen: NaiveDateTime,
    pub total: TimeDelta,
}

/// Identity block included in a report when the lookup went through an
/// external account id.
#[derive(Debug, Clone, Serialize)]
pub struct IdentitySummary {
    pub name: String,
    pub state: String,
    pub created_on: Option<String>,
    pub profile_url: String,
}

/// Everything the chat frontend and the renderer need for one lookup.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub player_id: String,
    pub player_name: String,
    pub player_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentitySummary>,
    pub first_seen: NaiveDateTime,
    pub first_seen_ago: String,
    pub total_seconds: i64,
    pub total_online: String,
    pub session_count: usize,
    /// Records dropped during timestamp resolution (data-quality warning).
    pub skipped_records: usize,
    /// True when pagination stopped early; the stats below may undercount.
    pub truncated: bool,
    pub grid: OccupancyGrid,
}
