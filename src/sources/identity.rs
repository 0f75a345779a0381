use crate::config::IdentityConfig;
use crate::error::app_error::AppError;
use crate::models::player::IdentityProfile;
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use serde::Deserialize;
use std::time::Duration;

pub const IDENTITY_SOURCE: &str = "identity service";

/// External account handle -> display name / online flag / creation instant.
/// Used only to pretty-print results, never by the aggregation core.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn lookup(&self, account_id: &str) -> Result<Option<IdentityProfile>, AppError>;
}

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    #[serde(default)]
    response: SummariesBody,
}

#[derive(Debug, Default, Deserialize)]
struct SummariesBody {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummary {
    #[serde(default)]
    personaname: Option<String>,
    #[serde(default)]
    personastate: i32,
    #[serde(default)]
    timecreated: Option<i64>,
}

/// Steam Web API-compatible identity client.
pub struct SteamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SteamClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::http(IDENTITY_SOURCE, e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl IdentitySource for SteamClient {
    async fn lookup(&self, account_id: &str) -> Result<Option<IdentityProfile>, AppError> {
        let url = format!("{}/ISteamUser/GetPlayerSummaries/v0002/", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("steamids", account_id)])
            .send()
            .await
            .map_err(|e| AppError::http(IDENTITY_SOURCE, e))?;

        if !response.status().is_success() {
            return Err(AppError::unavailable(IDENTITY_SOURCE, response.status().as_u16()));
        }

        let envelope = response
            .json::<SummariesEnvelope>()
            .await
            .map_err(|e| AppError::http(IDENTITY_SOURCE, e))?;

        Ok(envelope.response.players.into_iter().next().map(profile_from))
    }
}

fn profile_from(summary: PlayerSummary) -> IdentityProfile {
    IdentityProfile {
        name: summary.personaname.unwrap_or_else(|| "Unknown".to_string()),
        online: summary.personastate > 0,
        created: summary
            .timecreated
            .and_then(|secs| Local.timestamp_opt(secs, 0).single())
            .map(|created| created.naive_local()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_state_zero_is_offline() {
        let profile = profile_from(PlayerSummary {
            personaname: Some("rustacean".to_string()),
            personastate: 0,
            timecreated: Some(1_234_567_890),
        });

        assert_eq!(profile.name, "rustacean");
        assert!(!profile.online);
        assert!(profile.created.is_some());
    }

    #[test]
    fn any_positive_persona_state_is_online() {
        for state in [1, 2, 3, 6] {
            let profile = profile_from(PlayerSummary {
                personaname: None,
                personastate: state,
                timecreated: None,
            });
            assert!(profile.online);
            assert_eq!(profile.name, "Unknown");
            assert!(profile.created.is_none());
        }
    }

    #[test]
    fn summaries_envelope_tolerates_missing_fields() {
        let envelope: SummariesEnvelope = serde_json::from_str(r#"{"response":{"players":[{}]}}"#).expect("parses");
        assert_eq!(envelope.response.players.len(), 1);

        let empty: SummariesEnvelope = serde_json::from_str("{}").expect("parses");
        assert!(empty.response.players.is_empty());
    }
}
