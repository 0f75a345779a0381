pub mod grid;
pub mod player;
pub mod session;
