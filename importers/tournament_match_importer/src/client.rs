use std::{fmt, num::NonZeroU32, sync::LazyLock, time::Duration};

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use regex::Regex;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use tracing::debug;

use crate::config::ImporterConfig;
use crate::types::{ExternalMatch, Participant, TournamentInfo};

const SERVICE_DOMAIN: &str = "challonge.com";

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

static TOURNAMENT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?P<host>[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+)(?::\d+)?/(?:[A-Za-z0-9_.-]+/)?(?P<id>[A-Za-z0-9_-]+)/?(?:[?#].*)?$",
    )
    .unwrap()
});

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("CHALLONGE_API_KEY is not set")]
    MissingApiKey,
    #[error("requests per second must be greater than zero")]
    InvalidRateLimit,
    #[error("bracket service returned HTTP {status} for tournament {tournament_id}")]
    Status {
        status: StatusCode,
        tournament_id: String,
    },
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("unexpected response body from {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for ClientError {
    // The request URL carries the API key.
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.without_url())
    }
}

/// Read access to a hosted bracket.
#[allow(async_fn_in_trait)]
pub trait TournamentSource {
    async fn tournament(&self, tournament_id: &str) -> Result<TournamentInfo, ClientError>;
    async fn matches(&self, tournament_id: &str) -> Result<Vec<ExternalMatch>, ClientError>;
    async fn participants(&self, tournament_id: &str) -> Result<Vec<Participant>, ClientError>;
}

#[derive(Deserialize)]
struct TournamentEnvelope {
    tournament: TournamentInfo,
}

#[derive(Deserialize)]
struct MatchEnvelope {
    #[serde(rename = "match")]
    inner: ExternalMatch,
}

#[derive(Deserialize)]
struct ParticipantEnvelope {
    participant: Participant,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdInner {
    Number(i64),
    String(String),
}

impl IdInner {
    fn into_id<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            IdInner::Number(n) => Ok(n),
            IdInner::String(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id {:?}", s))),
        }
    }
}

/// Accepts ids sent either as JSON numbers or numeric strings.
pub(crate) fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    IdInner::deserialize(deserializer)?.into_id()
}

pub(crate) fn lenient_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<IdInner>::deserialize(deserializer)?
        .map(|id| id.into_id())
        .transpose()
}

/// Pulls the tournament identifier out of a bare id or a tournament URL.
///
/// Tournaments hosted under an organisation subdomain are addressed as
/// `{subdomain}-{id}` by the API.
pub fn extract_tournament_id(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if BARE_ID.is_match(reference) {
        return Some(reference.to_string());
    }

    let captures = TOURNAMENT_URL.captures(reference)?;
    let host = captures["host"].to_ascii_lowercase();
    let id = &captures["id"];

    let subdomain = host
        .strip_suffix(SERVICE_DOMAIN)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|prefix| !prefix.is_empty() && *prefix != "www" && !prefix.contains('.'));

    Some(match subdomain {
        Some(subdomain) => format!("{}-{}", subdomain, id),
        None => id.to_string(),
    })
}

pub struct ChallongeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl fmt::Debug for ChallongeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallongeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ChallongeClient {
    pub fn new(config: &ImporterConfig) -> Result<Self, ClientError> {
        let api_key = config
            .challonge
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ClientError::MissingApiKey)?
            .to_string();

        let client = reqwest::Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .build()?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limits.requests_per_second)
                .ok_or(ClientError::InvalidRateLimit)?,
        );

        Ok(Self {
            client,
            base_url: config.challonge.base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        tournament_id: &str,
        path: &str,
    ) -> Result<T, ClientError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                tournament_id: tournament_id.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl TournamentSource for ChallongeClient {
    async fn tournament(&self, tournament_id: &str) -> Result<TournamentInfo, ClientError> {
        let envelope: TournamentEnvelope = self
            .get_json(tournament_id, &format!("tournaments/{}.json", tournament_id))
            .await?;
        Ok(envelope.tournament)
    }

    async fn matches(&self, tournament_id: &str) -> Result<Vec<ExternalMatch>, ClientError> {
        let envelopes: Vec<MatchEnvelope> = self
            .get_json(tournament_id, &format!("tournaments/{}/matches.json", tournament_id))
            .await?;
        debug!("Tournament {} has {} matches", tournament_id, envelopes.len());
        Ok(envelopes.into_iter().map(|e| e.inner).collect())
    }

    async fn participants(&self, tournament_id: &str) -> Result<Vec<Participant>, ClientError> {
        let envelopes: Vec<ParticipantEnvelope> = self
            .get_json(
                tournament_id,
                &format!("tournaments/{}/participants.json", tournament_id),
            )
            .await?;
        Ok(envelopes.into_iter().map(|e| e.participant).collect())
    }
}
