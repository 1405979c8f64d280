use tracing::{debug, warn};

use crate::client::TournamentSource;
use crate::types::Participant;

/// Why a participant id could not be turned into a name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameFailure {
    #[error("participant {id} is not among the {known} listed participants")]
    NotListed { id: i64, known: usize },
    #[error("participant list unavailable while resolving participant {id}: {reason}")]
    RosterUnavailable { id: i64, reason: String },
}

impl NameFailure {
    pub fn participant_id(&self) -> i64 {
        match self {
            NameFailure::NotListed { id, .. } | NameFailure::RosterUnavailable { id, .. } => *id,
        }
    }

    pub fn fallback_name(&self) -> String {
        synthetic_name(self.participant_id())
    }
}

pub fn synthetic_name(id: i64) -> String {
    format!("Player {}", id)
}

/// Direct id lookup first, then `id` as a 1-based position in the list,
/// since some brackets report seeds instead of participant ids.
pub fn resolve_from_list(id: i64, participants: &[Participant]) -> Result<String, NameFailure> {
    let by_id = participants
        .iter()
        .find(|p| p.id == id)
        .and_then(Participant::display_name);

    let by_position = || {
        usize::try_from(id)
            .ok()
            .and_then(|position| position.checked_sub(1))
            .and_then(|index| participants.get(index))
            .and_then(Participant::display_name)
    };

    by_id
        .or_else(by_position)
        .map(str::to_string)
        .ok_or(NameFailure::NotListed {
            id,
            known: participants.len(),
        })
}

#[derive(Debug, Default)]
enum RosterState {
    #[default]
    NotFetched,
    Loaded(Vec<Participant>),
    Unavailable(String),
}

/// Participant list of one tournament, fetched on first need and kept for
/// the rest of the import. A failed fetch is remembered too.
#[derive(Debug, Default)]
pub struct ParticipantRoster {
    state: RosterState,
}

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fetched(&self) -> bool {
        !matches!(self.state, RosterState::NotFetched)
    }

    /// Name for one side of a match. A name embedded in the match wins and
    /// never triggers a fetch.
    pub async fn resolve<S: TournamentSource>(
        &mut self,
        source: &S,
        tournament_id: &str,
        id: i64,
        embedded_name: Option<&str>,
    ) -> Result<String, NameFailure> {
        if let Some(name) = embedded_name.map(str::trim).filter(|name| !name.is_empty()) {
            return Ok(name.to_string());
        }

        if !self.is_fetched() {
            self.state = match source.participants(tournament_id).await {
                Ok(participants) => {
                    debug!(
                        "Loaded {} participants for tournament {}",
                        participants.len(),
                        tournament_id
                    );
                    RosterState::Loaded(participants)
                }
                Err(e) => {
                    warn!("Could not load participants for tournament {}: {}", tournament_id, e);
                    RosterState::Unavailable(e.to_string())
                }
            };
        }

        match &self.state {
            RosterState::Loaded(participants) => resolve_from_list(id, participants),
            RosterState::Unavailable(reason) => Err(NameFailure::RosterUnavailable {
                id,
                reason: reason.clone(),
            }),
            RosterState::NotFetched => Err(NameFailure::RosterUnavailable {
                id,
                reason: "participant list was never requested".to_string(),
            }),
        }
    }
}
