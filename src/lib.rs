mod config;
mod context;
mod error;
mod middleware;
mod models;
mod routes;
mod service;
mod sources;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::context::ServerSelections;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use crate::service::presence::PresenceService;
use crate::sources::identity::{IdentitySource, SteamClient};
use crate::sources::tracker::{SessionSource, TrackerClient};
use rocket::{Build, Rocket, catchers};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence for per-module control, e.g.
    // RUST_LOG=info,player_pulse::sources=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // try_init so repeated assembly in tests is harmless
    if json_format {
        subscriber.json().try_init().ok();
    } else {
        subscriber.try_init().ok();
    }
}

/// Assemble the service against the real remote sources.
pub fn build_rocket(config: Config) -> Rocket<Build> {
    let tracker = Arc::new(TrackerClient::new(&config.tracker).expect("Failed to build tracker client"));
    let identity = Arc::new(SteamClient::new(&config.identity).expect("Failed to build identity client"));

    build_rocket_with_sources(config, tracker, identity)
}

/// Assembly seam: tests inject mock sources here so command handling runs
/// without any network.
pub fn build_rocket_with_sources(
    config: Config,
    sessions: Arc<dyn SessionSource>,
    identity: Arc<dyn IdentitySource>,
) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    let service = PresenceService::new(sessions, identity, config.stats.merge_overlaps);

    rocket::custom(figment)
        .attach(RequestLogger)
        .manage(Arc::new(ServerSelections::default()))
        .manage(Arc::new(service))
        .mount("/api/server", app_routes::server::routes())
        .mount("/api/player", app_routes::player::routes())
        .mount("/api/health", app_routes::health::routes())
        .register("/api", catchers![app_routes::error::not_found, app_routes::error::conflict])
}
