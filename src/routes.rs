pub mod error;
pub mod health;
pub mod player;
pub mod server;
