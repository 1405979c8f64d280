use tracing::{debug, info, warn};

use crate::catalog::{resolve_logo, MatchStore, SeasonDirectory, StoreError, TeamCatalog};
use crate::client::{extract_tournament_id, ClientError, TournamentSource};
use crate::participants::ParticipantRoster;
use crate::schedule::schedule_date;
use crate::score::{aggregate, parse_set_scores};
use crate::types::{
    round_label, ExternalMatch, ImportRequest, InternalMatch, MatchStatus, ResolvedParticipant,
    TournamentInfo,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("season {0} does not exist")]
    UnknownSeason(i64),
    #[error("no tournament identifier found in {0:?}")]
    InvalidTournamentReference(String),
    #[error("match {match_id} of round {round} has no representable date")]
    Unschedulable { match_id: i64, round: i32 },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts for the end-of-import log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_round: usize,
    pub skipped_unseeded: usize,
}

/// A bracket match that survived the round and seeding filters.
struct Playable<'m> {
    external: &'m ExternalMatch,
    player1_id: i64,
    player2_id: i64,
}

/// Everything a single match needs from the enclosing import.
struct ImportContext<'r> {
    request: &'r ImportRequest,
    tournament_id: String,
    tournament: TournamentInfo,
    season_id: i64,
    total_matches: usize,
}

pub struct TournamentImporter<'a, T, S, C, M> {
    source: &'a T,
    seasons: &'a S,
    teams: &'a C,
    store: &'a M,
}

impl<'a, T, S, C, M> TournamentImporter<'a, T, S, C, M>
where
    T: TournamentSource,
    S: SeasonDirectory,
    C: TeamCatalog,
    M: MatchStore,
{
    pub fn new(source: &'a T, seasons: &'a S, teams: &'a C, store: &'a M) -> Self {
        Self {
            source,
            seasons,
            teams,
            store,
        }
    }

    /// Imports every seeded match of the tournament (or of one round) and
    /// returns the stored matches. Matches stored before a fatal error stay
    /// stored.
    pub async fn import(&self, request: &ImportRequest) -> Result<Vec<InternalMatch>, ImportError> {
        info!("Resolving season {}", request.season_id);
        let season = self
            .seasons
            .find_season(request.season_id)
            .await?
            .ok_or(ImportError::UnknownSeason(request.season_id))?;

        let tournament_id = extract_tournament_id(&request.tournament)
            .ok_or_else(|| ImportError::InvalidTournamentReference(request.tournament.clone()))?;

        info!("Fetching tournament {} for season '{}'", tournament_id, season.name);
        let tournament = self.source.tournament(&tournament_id).await?;
        let external_matches = self.source.matches(&tournament_id).await?;

        let mut summary = ImportSummary::default();
        let playable = select_playable(&external_matches, request.round, &mut summary);
        info!(
            "Importing {} of {} matches from '{}'",
            playable.len(),
            external_matches.len(),
            tournament.name
        );

        let context = ImportContext {
            request,
            tournament_id,
            tournament,
            season_id: season.id,
            total_matches: playable.len(),
        };

        let mut roster = ParticipantRoster::new();
        let mut imported = Vec::with_capacity(playable.len());
        for (match_index, candidate) in playable.iter().enumerate() {
            let record = self
                .build_match(&context, &mut roster, candidate, match_index)
                .await?;
            let stored = self.store.create_match(&record).await?;
            info!(
                "Imported {}: {} vs {} on {}",
                stored.label, stored.home_team, stored.away_team, stored.date
            );
            imported.push(stored);
        }

        summary.imported = imported.len();
        info!(
            "Import of {} finished: {} imported, {} outside round filter, {} not yet seeded",
            context.tournament_id, summary.imported, summary.skipped_round, summary.skipped_unseeded
        );
        Ok(imported)
    }

    async fn build_match(
        &self,
        context: &ImportContext<'_>,
        roster: &mut ParticipantRoster,
        playable: &Playable<'_>,
        match_index: usize,
    ) -> Result<InternalMatch, ImportError> {
        let external = playable.external;
        let request = context.request;

        let completed = external.is_complete();
        let date = schedule_date(
            external.round,
            request.round_start,
            request.round_end,
            match_index,
            context.total_matches,
            request.spacing,
            completed,
        )
        .ok_or(ImportError::Unschedulable {
            match_id: external.id,
            round: external.round,
        })?;

        let home = self
            .resolve_side(
                roster,
                &context.tournament_id,
                playable.player1_id,
                external.player1_name.as_deref(),
            )
            .await;
        let away = self
            .resolve_side(
                roster,
                &context.tournament_id,
                playable.player2_id,
                external.player2_name.as_deref(),
            )
            .await;

        let sets = parse_set_scores(external.scores_csv());

        Ok(InternalMatch {
            id: None,
            label: format!(
                "{} - Match {}",
                context.tournament.name,
                external.match_number.unwrap_or(external.id)
            ),
            status: if completed {
                MatchStatus::Completed
            } else {
                MatchStatus::Scheduled
            },
            round_label: round_label(external.round),
            external_match_id: external.id,
            external_tournament_id: context.tournament_id.clone(),
            external_round: external.round,
            home_team: home.name,
            away_team: away.name,
            home_logo: home.logo,
            away_logo: away.logo,
            set_scores: sets.slots(),
            score: aggregate(&sets),
            date,
            season_id: context.season_id,
            tags: request.tags.clone(),
        })
    }

    /// Name and logo for one side. Lookup failures degrade to a synthetic
    /// name or a missing logo; they never abort the import.
    async fn resolve_side(
        &self,
        roster: &mut ParticipantRoster,
        tournament_id: &str,
        participant_id: i64,
        embedded_name: Option<&str>,
    ) -> ResolvedParticipant {
        let name = match roster
            .resolve(self.source, tournament_id, participant_id, embedded_name)
            .await
        {
            Ok(name) => name,
            Err(failure) => {
                warn!("{}; using '{}'", failure, failure.fallback_name());
                failure.fallback_name()
            }
        };

        let logo = match resolve_logo(self.teams, &name).await {
            Ok(logo) => logo,
            Err(e) => {
                warn!("Logo lookup for '{}' failed: {}", name, e);
                None
            }
        };

        ResolvedParticipant { name, logo }
    }
}

fn select_playable<'m>(
    matches: &'m [ExternalMatch],
    round: Option<i32>,
    summary: &mut ImportSummary,
) -> Vec<Playable<'m>> {
    let mut playable = Vec::new();
    for external in matches {
        if round.is_some_and(|round| round != external.round) {
            summary.skipped_round += 1;
            continue;
        }
        let Some((player1_id, player2_id)) = external.seeded_ids() else {
            debug!("Skipping match {}: bracket slot not seeded yet", external.id);
            summary.skipped_unseeded += 1;
            continue;
        };
        playable.push(Playable {
            external,
            player1_id,
            player2_id,
        });
    }
    playable
}
