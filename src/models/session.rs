use crate::error::app_error::AppError;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// One page of session records as returned by the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPage {
    #[serde(default)]
    pub data: Vec<SessionRecord>,
    #[serde(default)]
    pub links: PageLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    /// Opaque URL of the next page. Encodes server-side cursor state, so it is
    /// followed verbatim rather than rebuilt from a page number.
    pub next: Option<String>,
}

/// Raw session record as delivered by the tracker, timestamps unparsed.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub id: String,
    pub attributes: SessionAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionAttributes {
    pub start: String,
    /// Absent while the session is still open.
    pub stop: Option<String>,
}

/// Everything a single fetch produced. `truncated` is set when the pagination
/// loop ended early (failed page or page cap) instead of draining naturally.
#[derive(Debug, Clone, Default)]
pub struct SessionFetch {
    pub records: Vec<SessionRecord>,
    pub truncated: bool,
}

/// One connect-to-disconnect period with both endpoints resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
}

/// Parse a tracker timestamp. The trailing `Z` marks the value as
/// zone-agnostic rather than UTC, so it is stripped and the rest is read as a
/// naive instant.
pub fn parse_instant(raw: &str) -> Result<NaiveDateTime, AppError> {
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    naive.parse::<NaiveDateTime>().map_err(|_| AppError::malformed_timestamp(raw))
}

impl Session {
    /// Resolve a raw record against `now`: an absent stop means the session is
    /// still open. A record whose start lies after its resolved stop is
    /// malformed and rejected.
    pub fn resolve(record: &SessionRecord, now: NaiveDateTime) -> Result<Self, AppError> {
        let start = parse_instant(&record.attributes.start)?;
        let stop = match &record.attributes.stop {
            Some(raw) => parse_instant(raw)?,
            None => now,
        };

        if start > stop {
            return Err(AppError::malformed_timestamp(format!(
                "start {} after stop {}",
                start, stop
            )));
        }

        Ok(Session { start, stop })
    }

    pub fn duration(&self) -> chrono::TimeDelta {
        self.stop - self.start
    }
}

/// Resolve a whole fetched batch, skipping malformed records. Returns the
/// resolved sessions in arrival order and the number of records skipped, which
/// callers surface as a data-quality warning rather than a failure.
pub fn resolve_batch(records: &[SessionRecord], now: NaiveDateTime) -> (Vec<Session>, usize) {
    let mut sessions = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for record in records {
        match Session::resolve(record, now) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!(record_id = %record.id, error = %e, "skipping malformed session record");
                skipped += 1;
            }
        }
    }

    (sessions, skipped)
}
