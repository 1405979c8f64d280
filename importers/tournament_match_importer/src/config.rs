use serde::{Deserialize, Serialize};
use std::{env, fmt};

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallongeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for ChallongeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallongeConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for ChallongeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.challonge.com/v1".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimits {
    pub requests_per_second: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            requests_per_second: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; LeagueImporter/1.0)".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImporterConfig {
    pub challonge: ChallongeConfig,
    pub rate_limits: RateLimits,
    pub http: HttpConfig,
    pub database_url: Option<String>,
}

impl ImporterConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable numbers keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(key) = lookup("CHALLONGE_API_KEY") {
            config.challonge.api_key = Some(key);
        }
        if let Some(url) = lookup("CHALLONGE_BASE_URL") {
            config.challonge.base_url = url;
        }
        if let Some(rps) = lookup("CHALLONGE_RATE_LIMIT_RPS").and_then(|r| r.parse::<u32>().ok()) {
            config.rate_limits.requests_per_second = rps;
        }
        if let Some(user_agent) = lookup("IMPORTER_USER_AGENT") {
            config.http.user_agent = user_agent;
        }
        if let Some(timeout) = lookup("IMPORTER_TIMEOUT_SECS").and_then(|t| t.parse::<u64>().ok()) {
            config.http.request_timeout_secs = timeout;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = Some(url);
        }

        config
    }
}
