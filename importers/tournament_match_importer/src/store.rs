use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

use crate::catalog::{MatchStore, SeasonDirectory, StoreError, TeamCatalog};
use crate::types::{InternalMatch, Season};

/// League database. Tables: `season`, `team`, `matches`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

impl SeasonDirectory for PgStore {
    async fn find_season(&self, season_id: i64) -> Result<Option<Season>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM season WHERE id = $1")
            .bind(season_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, name)| Season { id, name }))
    }
}

impl TeamCatalog for PgStore {
    async fn find_logo(&self, name: &str) -> Result<Option<String>, StoreError> {
        let logo = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT logo FROM team
            WHERE LOWER(name) = LOWER($1)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(logo.flatten())
    }
}

impl MatchStore for PgStore {
    // No uniqueness check on the external ids: importing the same bracket
    // twice creates the matches twice.
    async fn create_match(&self, record: &InternalMatch) -> Result<InternalMatch, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO matches (
                label, status, round_label,
                external_match_id, external_tournament_id, external_round,
                home_team, away_team, home_logo, away_logo,
                set_scores, home_score, away_score,
                match_date, season_id, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(&record.label)
        .bind(record.status.as_str())
        .bind(&record.round_label)
        .bind(record.external_match_id)
        .bind(&record.external_tournament_id)
        .bind(record.external_round)
        .bind(&record.home_team)
        .bind(&record.away_team)
        .bind(&record.home_logo)
        .bind(&record.away_logo)
        .bind(&record.set_scores)
        .bind(record.score.side_a)
        .bind(record.score.side_b)
        .bind(record.date)
        .bind(record.season_id)
        .bind(&record.tags)
        .fetch_one(&self.pool)
        .await?;

        debug!("Inserted match {} as id {}", record.label, id);
        Ok(InternalMatch {
            id: Some(id),
            ..record.clone()
        })
    }
}
