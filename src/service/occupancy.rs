use crate::models::grid::{BUCKETS_PER_DAY, OccupancyGrid, TimeWindow};
use crate::models::session::Session;

/// Discretize sessions into the window's day x bucket grid. Each cell holds
/// the fraction of the bucket covered by sessions, summed across sessions
/// without merging: duplicated or overlapping sessions keep double-counting,
/// consistent with the total-duration calculation.
pub fn build_grid(sessions: &[Session], window: &TimeWindow) -> OccupancyGrid {
    let mut cells = vec![vec![0.0f64; BUCKETS_PER_DAY]; window.days.len()];

    for (row, day) in window.days.iter().enumerate() {
        for bucket in 0..BUCKETS_PER_DAY {
            let (bucket_start, bucket_end) = window.bucket_span(*day, bucket);
            let bucket_seconds = (bucket_end - bucket_start).num_seconds() as f64;

            for session in sessions {
                if bucket_start <= session.stop && bucket_end >= session.start {
                    let overlap_start = session.start.max(bucket_start);
                    let overlap_end = session.stop.min(bucket_end);
                    let overlap_seconds = (overlap_end - overlap_start).num_seconds();
                    if overlap_seconds > 0 {
                        cells[row][bucket] += overlap_seconds as f64 / bucket_seconds;
                    }
                }
            }
        }
    }

    OccupancyGrid {
        days: window.days.clone(),
        bucket_boundaries: window.boundaries.clone(),
        cells,
    }
}
