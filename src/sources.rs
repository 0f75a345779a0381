pub mod identity;
pub mod tracker;
