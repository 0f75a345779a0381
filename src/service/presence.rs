use crate::error::app_error::AppError;
use crate::models::grid::TimeWindow;
use crate::models::player::{IdentityProfile, IdentitySummary, PlayerMatch, PlayerReport, PresenceStats};
use crate::models::session::{Session, resolve_batch};
use crate::service::occupancy::build_grid;
use crate::sources::identity::IdentitySource;
use crate::sources::tracker::SessionSource;
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::sync::Arc;
use tracing::{debug, warn};

const TRACKER_SITE: &str = "https://www.battlemetrics.com";
const IDENTITY_SITE: &str = "http://steamcommunity.com";

/// Derive first-seen and cumulative online time from a session list. `None`
/// for an empty list so callers can report "no data" instead of zeros.
/// Overlapping sessions double-count their shared span by design.
pub fn summarize(sessions: &[Session]) -> Option<PresenceStats> {
    let first_seen = sessions.iter().map(|s| s.start).min()?;
    let total = sessions.iter().fold(TimeDelta::zero(), |acc, s| acc + s.duration());

    Some(PresenceStats { first_seen, total })
}

/// Opt-in variant of the total: merges overlapping intervals first so shared
/// spans count once. Kept behind the `stats.merge_overlaps` config flag.
pub fn merged_total(sessions: &[Session]) -> TimeDelta {
    let mut spans: Vec<(NaiveDateTime, NaiveDateTime)> =
        sessions.iter().map(|s| (s.start, s.stop)).collect();
    spans.sort();

    let mut total = TimeDelta::zero();
    let mut current: Option<(NaiveDateTime, NaiveDateTime)> = None;

    for (start, stop) in spans {
        match current {
            Some((cur_start, cur_stop)) if start <= cur_stop => {
                current = Some((cur_start, cur_stop.max(stop)));
            }
            Some((cur_start, cur_stop)) => {
                total += cur_stop - cur_start;
                current = Some((start, stop));
            }
            None => current = Some((start, stop)),
        }
    }
    if let Some((cur_start, cur_stop)) = current {
        total += cur_stop - cur_start;
    }

    total
}

pub fn format_time_ago(first_seen: NaiveDateTime, now: NaiveDateTime) -> String {
    format!("{} days ago", (now - first_seen).num_days())
}

pub fn format_total_hours(total: TimeDelta) -> String {
    format!("{} hours", total.num_hours())
}

/// Orchestrates one lookup command: search, drain sessions, aggregate, grid.
pub struct PresenceService {
    sessions: Arc<dyn SessionSource>,
    identity: Arc<dyn IdentitySource>,
    merge_overlaps: bool,
}

impl PresenceService {
    pub fn new(sessions: Arc<dyn SessionSource>, identity: Arc<dyn IdentitySource>, merge_overlaps: bool) -> Self {
        Self {
            sessions,
            identity,
            merge_overlaps,
        }
    }

    pub async fn lookup_by_name(&self, server_id: &str, name: &str) -> Result<PlayerReport, AppError> {
        let player = self
            .sessions
            .search_player(name, server_id)
            .await?
            .ok_or(AppError::PlayerNotFound)?;

        self.report_for(player, None, server_id).await
    }

    /// Resolve the external account to a display name first, then proceed as
    /// the name-based lookup with the identity block attached.
    pub async fn lookup_by_account(&self, server_id: &str, account_id: &str) -> Result<PlayerReport, AppError> {
        let profile = self
            .identity
            .lookup(account_id)
            .await?
            .ok_or(AppError::PlayerNotFound)?;

        let player = self
            .sessions
            .search_player(&profile.name, server_id)
            .await?
            .ok_or(AppError::PlayerNotFound)?;

        self.report_for(player, Some(identity_summary(account_id, &profile)), server_id)
            .await
    }

    async fn report_for(
        &self,
        player: PlayerMatch,
        identity: Option<IdentitySummary>,
        server_id: &str,
    ) -> Result<PlayerReport, AppError> {
        let fetch = self.sessions.fetch_sessions(&player.id, Some(server_id)).await?;
        if fetch.records.is_empty() {
            return Err(AppError::NoSessionData);
        }

        // One "now" per command; open sessions and the window both use it.
        let now = Local::now().naive_local();
        let (sessions, skipped) = resolve_batch(&fetch.records, now);
        if skipped > 0 {
            warn!(player_id = %player.id, skipped, "dropped session records during resolution");
        }

        let stats = summarize(&sessions).ok_or(AppError::NoSessionData)?;
        let total = if self.merge_overlaps {
            merged_total(&sessions)
        } else {
            stats.total
        };

        let window = TimeWindow::trailing(now.date());
        let grid = build_grid(&sessions, &window);

        debug!(
            player_id = %player.id,
            sessions = sessions.len(),
            truncated = fetch.truncated,
            "presence report built"
        );

        Ok(PlayerReport {
            player_url: format!("{}/players/{}", TRACKER_SITE, player.id),
            player_id: player.id,
            player_name: player.name,
            identity,
            first_seen: stats.first_seen,
            first_seen_ago: format_time_ago(stats.first_seen, now),
            total_seconds: total.num_seconds(),
            total_online: format_total_hours(total),
            session_count: sessions.len(),
            skipped_records: skipped,
            truncated: fetch.truncated,
            grid,
        })
    }
}

/// Public URL for a selected server, echoed back on selection.
pub fn server_url(server_id: &str) -> String {
    format!("{}/servers/rust/{}", TRACKER_SITE, server_id)
}

fn identity_summary(account_id: &str, profile: &IdentityProfile) -> IdentitySummary {
    IdentitySummary {
        name: profile.name.clone(),
        state: if profile.online { "Online" } else { "Offline" }.to_string(),
        created_on: profile.created.map(|created| created.format("%Y-%m-%d").to_string()),
        profile_url: format!("{}/profiles/{}", IDENTITY_SITE, account_id),
    }
}
