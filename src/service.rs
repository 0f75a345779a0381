pub mod occupancy;
pub mod presence;
