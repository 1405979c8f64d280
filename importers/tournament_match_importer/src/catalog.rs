//! League-side collaborators the importer reads from and writes to.

use tracing::debug;

use crate::types::{InternalMatch, Season};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[allow(async_fn_in_trait)]
pub trait SeasonDirectory {
    async fn find_season(&self, season_id: i64) -> Result<Option<Season>, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait TeamCatalog {
    /// Logo of the team whose name equals `name` ignoring case.
    async fn find_logo(&self, name: &str) -> Result<Option<String>, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait MatchStore {
    /// Persists a match and returns it with its generated id.
    async fn create_match(&self, record: &InternalMatch) -> Result<InternalMatch, StoreError>;
}

/// Looks up the artwork for a team name. A missing team is `Ok(None)`.
pub async fn resolve_logo<C: TeamCatalog>(
    catalog: &C,
    name: &str,
) -> Result<Option<String>, StoreError> {
    let logo = catalog.find_logo(name).await?;
    if logo.is_none() {
        debug!("No logo found for team '{}'", name);
    }
    Ok(logo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Teams(HashMap<String, Option<String>>);

    impl TeamCatalog for Teams {
        async fn find_logo(&self, name: &str) -> Result<Option<String>, StoreError> {
            Ok(self
                .0
                .iter()
                .find(|(team, _)| team.to_lowercase() == name.to_lowercase())
                .and_then(|(_, logo)| logo.clone()))
        }
    }

    struct Offline;

    impl TeamCatalog for Offline {
        async fn find_logo(&self, _name: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    fn teams() -> Teams {
        Teams(HashMap::from([
            ("Net Ninjas".to_string(), Some("logos/net-ninjas.png".to_string())),
            ("Block Party".to_string(), None),
        ]))
    }

    #[tokio::test]
    async fn test_resolve_logo_ignores_case() {
        let logo = resolve_logo(&teams(), "NET ninjas").await.unwrap();
        assert_eq!(logo.as_deref(), Some("logos/net-ninjas.png"));
    }

    #[tokio::test]
    async fn test_missing_team_or_logo_is_not_an_error() {
        assert_eq!(resolve_logo(&teams(), "Block Party").await.unwrap(), None);
        assert_eq!(resolve_logo(&teams(), "Player 7").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported() {
        assert!(resolve_logo(&Offline, "Net Ninjas").await.is_err());
    }
}
