//! Anime Watch CLI application.

mod watch;

use anime_api::{AnimeApiClient, ProviderError, SeasonQuery};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::{Config, Resolution};
use source_resolver::ServerId;
use std::path::PathBuf;
use tracing::{error, info, warn};
use watch::WatchOptions;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the stream for an episode
    Watch {
        /// Episode identifier, e.g. nonton-sousou-no-frieren-episode-3
        episode_id: String,

        /// Quality to switch to after loading (360p, 480p, 720p, 1080p)
        #[arg(short, long)]
        quality: Option<Resolution>,

        /// Server to switch to after loading (main or a host name)
        #[arg(short, long)]
        server: Option<ServerId>,
    },

    /// Home page listing
    Home,

    /// Ongoing anime
    Ongoing {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Anime details and episode list
    Anime { slug: String },

    /// All genres, or the anime of one genre
    Genres {
        slug: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Weekly release schedule
    Schedule,

    /// Seasonal anime
    Season {
        /// List known seasons
        #[arg(long, conflicts_with_all = ["year", "season"])]
        list: bool,

        #[arg(long, requires = "season")]
        year: Option<u16>,

        /// Season name, e.g. spring
        #[arg(long, requires = "year")]
        season: Option<String>,
    },

    /// Search anime by title
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?
        .with_env_overrides();

    // Initialize logging
    let mut log_config = shared::LogConfig::from_config(&config, "anime-watch");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    let mut client =
        AnimeApiClient::from_config(&config.anime_api).context("Failed to create API client")?;

    info!(
        config_file = %args.config.display(),
        base_url = %client.base_url(),
        cache_enabled = client.cache_stats().enabled,
        "Anime Watch starting"
    );

    if let Err(e) = run(args.command, &mut client, &config).await {
        if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
            error!(
                error = %provider_error,
                retryable = provider_error.is_retryable(),
                "Request failed"
            );
            if provider_error.is_retryable() {
                eprintln!("Failed to load data. Run the command again to retry.");
            }
        }
        return Err(e);
    }

    Ok(())
}

async fn run(command: Command, client: &mut AnimeApiClient, config: &Config) -> Result<()> {
    match command {
        Command::Watch {
            episode_id,
            quality,
            server,
        } => {
            let options = WatchOptions {
                default_resolution: config.player.default_resolution,
                quality,
                server,
            };
            let report = watch::watch_episode(client, &episode_id, &options).await?;
            if !report.state.is_resolved() {
                warn!(episode = %episode_id, "Nothing to play for this selection");
            }
            print_json(&report)
        }
        Command::Home => print_json(&client.home().await?),
        Command::Ongoing { page } => print_json(&client.ongoing(page).await?),
        Command::Anime { slug } => print_json(&client.anime(&slug).await?),
        Command::Genres { slug: None, .. } => print_json(&client.genres().await?),
        Command::Genres {
            slug: Some(slug),
            page,
        } => print_json(&client.genre(&slug, page).await?),
        Command::Schedule => print_json(&client.schedule().await?),
        Command::Season { list, year, season } => {
            let query = match (list, year, season) {
                (true, _, _) => SeasonQuery::List,
                (false, Some(year), Some(season)) => SeasonQuery::Specific { year, season },
                _ => SeasonQuery::Current,
            };
            print_json(&client.season(&query).await?)
        }
        Command::Search { query } => print_json(&client.search(&query).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_args() {
        let args = Args::try_parse_from([
            "anime-watch",
            "watch",
            "nonton-frieren-episode-3",
            "--quality",
            "480p",
            "--server",
            "doodstream",
        ])
        .unwrap();

        match args.command {
            Command::Watch {
                episode_id,
                quality,
                server,
            } => {
                assert_eq!(episode_id, "nonton-frieren-episode-3");
                assert_eq!(quality, Some(Resolution::P480));
                assert_eq!(server, Some(ServerId::Host(shared::Host::Doodstream)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_rejects_unknown_quality() {
        assert!(Args::try_parse_from(["anime-watch", "watch", "x", "--quality", "4k"]).is_err());
    }

    #[test]
    fn test_season_args() {
        assert!(Args::try_parse_from(["anime-watch", "season", "--list"]).is_ok());
        assert!(
            Args::try_parse_from(["anime-watch", "season", "--year", "2024", "--season", "fall"])
                .is_ok()
        );
        assert!(Args::try_parse_from(["anime-watch", "season", "--year", "2024"]).is_err());
        assert!(Args::try_parse_from(["anime-watch", "season", "--list", "--year", "2024"]).is_err());
    }
}
