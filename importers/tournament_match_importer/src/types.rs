use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::client::{lenient_id, lenient_opt_id};
use crate::score::AggregateScore;

/// Caller input for a single tournament import.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Tournament URL or bare identifier.
    pub tournament: String,
    pub season_id: i64,
    /// Only import matches of this round when set.
    pub round: Option<i32>,
    pub round_start: DateTime<Utc>,
    /// Expected to be after `round_start`; not checked here.
    pub round_end: DateTime<Utc>,
    pub spacing: Duration,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TournamentInfo {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One bracket match as reported by the bracket service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalMatch {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_id")]
    pub match_number: Option<i64>,
    pub round: i32,
    pub state: String,
    #[serde(default, deserialize_with = "lenient_opt_id")]
    pub player1_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_id")]
    pub player2_id: Option<i64>,
    #[serde(default)]
    pub player1_name: Option<String>,
    #[serde(default)]
    pub player2_name: Option<String>,
    #[serde(default)]
    pub scores_csv: Option<String>,
}

impl ExternalMatch {
    pub fn is_complete(&self) -> bool {
        self.state == "complete"
    }

    /// Both participant ids, or `None` while a bracket slot is still empty.
    pub fn seeded_ids(&self) -> Option<(i64, i64)> {
        Some((self.player1_id?, self.player2_id?))
    }

    pub fn scores_csv(&self) -> &str {
        self.scores_csv.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Participant {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Participant {
    /// Registered name, falling back to the account username.
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParticipant {
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Scheduled,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub id: i64,
    pub name: String,
}

/// A league match created from one bracket match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMatch {
    /// Assigned by the match store.
    pub id: Option<i64>,
    pub label: String,
    pub status: MatchStatus,
    pub round_label: String,
    pub external_match_id: i64,
    pub external_tournament_id: String,
    pub external_round: i32,
    pub home_team: String,
    pub away_team: String,
    pub home_logo: Option<String>,
    pub away_logo: Option<String>,
    /// Always `MAX_SETS` long, empty strings for sets not played.
    pub set_scores: Vec<String>,
    pub score: AggregateScore,
    pub date: DateTime<Utc>,
    pub season_id: i64,
    pub tags: Vec<String>,
}

pub fn round_label(round: i32) -> String {
    if round < 0 {
        format!("Losers Round {}", round.unsigned_abs())
    } else {
        format!("Round {}", round)
    }
}
