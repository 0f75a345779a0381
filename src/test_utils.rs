use crate::Config;
use crate::build_rocket_with_sources;
use crate::error::app_error::AppError;
use crate::models::player::{IdentityProfile, PlayerMatch};
use crate::models::session::{SessionAttributes, SessionFetch, SessionRecord};
use crate::sources::identity::IdentitySource;
use crate::sources::tracker::SessionSource;
use async_trait::async_trait;
use rocket::local::asynchronous::Client;
use std::sync::Arc;

/// Canned session source: always returns the same match and fetch result.
#[derive(Default)]
pub struct StaticSessions {
    pub matched: Option<PlayerMatch>,
    pub fetch: SessionFetch,
}

#[async_trait]
impl SessionSource for StaticSessions {
    async fn search_player(&self, _name: &str, _server_id: &str) -> Result<Option<PlayerMatch>, AppError> {
        Ok(self.matched.clone())
    }

    async fn fetch_sessions(&self, _player_id: &str, _server_id: Option<&str>) -> Result<SessionFetch, AppError> {
        Ok(self.fetch.clone())
    }
}

/// Canned identity source.
#[derive(Default)]
pub struct StaticIdentity {
    pub profile: Option<IdentityProfile>,
}

#[async_trait]
impl IdentitySource for StaticIdentity {
    async fn lookup(&self, _account_id: &str) -> Result<Option<IdentityProfile>, AppError> {
        Ok(self.profile.clone())
    }
}

pub fn sample_record(start: &str, stop: Option<&str>) -> SessionRecord {
    SessionRecord {
        id: "rec".to_string(),
        attributes: SessionAttributes {
            start: start.to_string(),
            stop: stop.map(String::from),
        },
    }
}

pub fn sample_match(id: &str, name: &str) -> PlayerMatch {
    PlayerMatch {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// Local Rocket client wired to mock sources; no network involved.
pub async fn test_client(sessions: StaticSessions, identity: StaticIdentity) -> Client {
    let rocket = build_rocket_with_sources(Config::default(), Arc::new(sessions), Arc::new(identity));
    Client::tracked(rocket).await.expect("valid rocket instance")
}
