use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tournament_match_importer::{
    client::ChallongeClient,
    config::ImporterConfig,
    import::TournamentImporter,
    store::PgStore,
    types::ImportRequest,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import the matches of a hosted bracket into a league season
    Import {
        /// Tournament URL or identifier
        #[arg(short, long)]
        tournament: String,
        /// Internal season id the matches belong to
        #[arg(short, long)]
        season: i64,
        /// Only import this round
        #[arg(short, long, allow_negative_numbers = true)]
        round: Option<i32>,
        /// Start of round 1 (RFC 3339)
        #[arg(long)]
        round_start: DateTime<Utc>,
        /// Latest allowed kickoff plus one hour (RFC 3339)
        #[arg(long)]
        round_end: DateTime<Utc>,
        /// Minutes between kickoffs on the same day
        #[arg(long, default_value_t = 90)]
        spacing_minutes: i64,
        /// Tag attached to every imported match, may be repeated
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

fn spacing_from_minutes(minutes: i64) -> Result<Duration> {
    Duration::try_minutes(minutes).ok_or_else(|| anyhow!("--spacing-minutes {} is out of range", minutes))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ImporterConfig::from_env();

    match cli.command {
        Commands::Import {
            tournament,
            season,
            round,
            round_start,
            round_end,
            spacing_minutes,
            tags,
        } => {
            if round_end <= round_start {
                warn!("Round end {} is not after round start {}", round_end, round_start);
            }

            let spacing = spacing_from_minutes(spacing_minutes)?;

            let client = ChallongeClient::new(&config)?;
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;
            let store = PgStore::connect(database_url)
                .await
                .context("Failed to connect to database")?;

            let request = ImportRequest {
                tournament,
                season_id: season,
                round,
                round_start,
                round_end,
                spacing,
                tags,
            };

            let importer = TournamentImporter::new(&client, &store, &store, &store);
            let imported = importer.import(&request).await?;

            for m in &imported {
                println!(
                    "{:>6}  {}  {:<14} {} {}-{} {}",
                    m.id.unwrap_or_default(),
                    m.date.format("%Y-%m-%d %H:%M"),
                    m.round_label,
                    m.home_team,
                    m.score.side_a,
                    m.score.side_b,
                    m.away_team
                );
            }
            info!("Imported {} matches", imported.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_out_of_range_is_an_error() {
        assert_eq!(spacing_from_minutes(90).unwrap(), Duration::minutes(90));
        assert!(spacing_from_minutes(i64::MAX / 10).is_err());
    }

    #[test]
    fn test_import_arguments_parse() {
        let cli = Cli::try_parse_from([
            "tournament_match_importer",
            "import",
            "--tournament",
            "spring_cup",
            "--season",
            "12",
            "--round",
            "-2",
            "--round-start",
            "2025-03-03T00:00:00Z",
            "--round-end",
            "2025-04-01T00:00:00Z",
        ])
        .unwrap();
        let Commands::Import { round, spacing_minutes, tags, .. } = cli.command;
        assert_eq!(round, Some(-2));
        assert_eq!(spacing_minutes, 90);
        assert!(tags.is_empty());
    }
}
