use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub tracker: TrackerConfig,
    pub identity: IdentityConfig,
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

/// Session-tracker source (BattleMetrics-compatible API).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackerConfig {
    pub base_url: String,
    /// Bearer token sent with every tracker request.
    pub api_token: String,
    /// Fixed page size for session pagination.
    pub page_size: u32,
    /// Hard cap on pages followed per fetch. The upstream cursor chain has no
    /// inherent end we can trust, so this must never be unlimited.
    pub max_pages: u32,
    pub request_timeout_secs: u64,
}

/// Identity lookup source (Steam Web API-compatible).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsConfig {
    /// When true, total online time merges overlapping sessions instead of
    /// summing them naively. Default false to match upstream semantics.
    pub merge_overlaps: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.battlemetrics.com".to_string(),
            api_token: String::new(),
            page_size: 100,
            max_pages: 100,
            request_timeout_secs: 10,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.steampowered.com".to_string(),
            api_key: String::new(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { merge_overlaps: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            tracker: TrackerConfig::default(),
            identity: IdentityConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Pulse.toml (base configuration file)
    /// 3. Environment variables (prefixed with PULSE_, e.g. PULSE_SERVER_PORT)
    /// 4. TRACKER_API_TOKEN / STEAM_API_KEY for the source credentials
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap()).nested())
            .merge(Toml::file("Pulse.toml").nested())
            .merge(Env::prefixed("PULSE_").split("_"))
            // Credentials come from flat env vars, not the nested PULSE_ scheme
            .merge(Env::raw().only(&["TRACKER_API_TOKEN"]).map(|_| "tracker.api_token".into()))
            .merge(Env::raw().only(&["STEAM_API_KEY"]).map(|_| "identity.api_key".into()));

        figment.extract()
    }
}
