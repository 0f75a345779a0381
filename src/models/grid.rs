use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Trailing window length in days, today included.
pub const WINDOW_DAYS: usize = 15;
/// Fixed 3-hour buckets, 8 per day.
pub const BUCKETS_PER_DAY: usize = 8;
pub const BUCKET_HOURS: u32 = 3;

/// The 15-day window partitioned into 3-hour buckets. The final boundary of
/// each day is 23:59 rather than 24:00 to absorb rounding; renderers label it
/// as end-of-day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    /// Oldest first, ending today.
    pub days: Vec<NaiveDate>,
    /// `BUCKETS_PER_DAY + 1` boundaries starting at midnight.
    pub boundaries: Vec<NaiveTime>,
}

impl TimeWindow {
    /// The trailing window ending at `today`, computed fresh per query.
    pub fn trailing(today: NaiveDate) -> Self {
        let days = (0..WINDOW_DAYS as u64)
            .rev()
            .map(|back| today - Days::new(back))
            .collect();

        let mut boundaries: Vec<NaiveTime> = (0..BUCKETS_PER_DAY as u32)
            .map(|bucket| NaiveTime::from_hms_opt(bucket * BUCKET_HOURS, 0, 0).expect("bucket boundary in range"))
            .collect();
        boundaries.push(NaiveTime::from_hms_opt(23, 59, 0).expect("end-of-day boundary"));

        TimeWindow { days, boundaries }
    }

    /// Absolute `[start, end)` span of one bucket on one day of the window.
    pub fn bucket_span(&self, day: NaiveDate, bucket: usize) -> (NaiveDateTime, NaiveDateTime) {
        (day.and_time(self.boundaries[bucket]), day.and_time(self.boundaries[bucket + 1]))
    }
}

/// Renderer-facing day x bucket table of fractional occupancy. Row order
/// (oldest first) and the bucket boundaries are a presentation contract the
/// axis labelling depends on; do not reorder.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancyGrid {
    pub days: Vec<NaiveDate>,
    pub bucket_boundaries: Vec<NaiveTime>,
    /// `days.len()` rows of `BUCKETS_PER_DAY` fractions. Sessions are not
    /// merged, so a cell can exceed 1.0 when several overlap one bucket.
    pub cells: Vec<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_fifteen_days_oldest_first() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let window = TimeWindow::trailing(today);

        assert_eq!(window.days.len(), WINDOW_DAYS);
        assert_eq!(window.days[0], NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(*window.days.last().unwrap(), today);
        assert!(window.days.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn buckets_step_by_three_hours_and_end_at_2359() {
        let window = TimeWindow::trailing(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());

        assert_eq!(window.boundaries.len(), BUCKETS_PER_DAY + 1);
        assert_eq!(window.boundaries[0], NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(window.boundaries[7], NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(*window.boundaries.last().unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn bucket_span_is_absolute() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let window = TimeWindow::trailing(today);

        let (start, end) = window.bucket_span(today, 3);
        assert_eq!(start, today.and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(end, today.and_hms_opt(12, 0, 0).unwrap());

        // Last bucket of the day is one minute short of midnight.
        let (start, end) = window.bucket_span(today, 7);
        assert_eq!(start, today.and_hms_opt(21, 0, 0).unwrap());
        assert_eq!(end, today.and_hms_opt(23, 59, 0).unwrap());
    }
}
