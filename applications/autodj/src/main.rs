/// Soul Auto-DJ - Non-repeating track picker
use clap::{Parser, Subcommand, ValueEnum};
use soul_autodj::{AutoDj, AutodjConfig};
use soul_core::{Track, TrackId};
use soul_shuffle::{ContextRegistry, RandomByTrack};
use soul_storage::{LibraryView, SqlitePool, SqliteTrackStore, StoreTrackCache};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "soul-autodj")]
#[command(about = "Pick tracks without repeating them", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the next tracks for an auto-DJ context
    Pick {
        /// Context name (defaults to autodj.default_context)
        #[arg(long)]
        context: Option<String>,
        /// Number of tracks to pick
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Selection strategy
        #[arg(long, value_enum, default_value_t = StrategyKind::Random)]
        strategy: StrategyKind,
    },
    /// List registered contexts
    Contexts,
    /// Show what a context picked most recently
    History {
        /// Context name (defaults to autodj.default_context)
        #[arg(long)]
        context: Option<String>,
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Remove a track from a context's upcoming picks
    Discard {
        /// Track to discard
        track_id: TrackId,
        /// Context name (defaults to autodj.default_context)
        #[arg(long)]
        context: Option<String>,
    },
    /// Mark a track as queued by hand on a context
    Insert {
        /// Track to insert
        track_id: TrackId,
        /// Context name (defaults to autodj.default_context)
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    /// Every eligible track equally likely
    Random,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soul_autodj=info,soul_shuffle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AutodjConfig::load_from(cli.config.as_deref())?;
    config.validate()?;

    let pool = soul_storage::create_pool(&config.storage.database_url).await?;
    soul_storage::run_migrations(&pool).await?;
    let registry = ContextRegistry::open(Arc::new(SqliteTrackStore::new(pool.clone()))).await?;

    match cli.command {
        Commands::Pick {
            context,
            count,
            strategy,
        } => {
            let context = context.unwrap_or_else(|| config.autodj.default_context.clone());
            let random_by = match strategy {
                StrategyKind::Random => RandomByTrack::new(),
            };
            let dj = AutoDj::start(
                &registry,
                random_by,
                &context,
                Arc::new(LibraryView),
                Arc::new(StoreTrackCache::new(pool.clone())),
                config.lookback(),
            )
            .await?;

            let report = dj.run(count).await?;
            for track in &report.picked {
                println!(
                    "{:>6}  {}{}",
                    track.id,
                    track.title,
                    track
                        .artist_name
                        .as_deref()
                        .map(|artist| format!(" - {artist}"))
                        .unwrap_or_default()
                );
            }
            if report.skipped > 0 {
                println!("({} track(s) could not be loaded)", report.skipped);
            }
            if report.exhausted {
                println!("No more eligible tracks for `{context}`");
            }
        }
        Commands::Contexts => {
            println!("Contexts:");
            for summary in registry.list().await? {
                println!(
                    "  {} - {} ({} picks)",
                    summary.id, summary.name, summary.history_entries
                );
            }
        }
        Commands::History { context, limit } => {
            let context = context.unwrap_or_else(|| config.autodj.default_context.clone());
            let context = registry.context(&context).await?;

            println!("History for {}:", context.name());
            for (track_id, at) in context.recent(limit).await? {
                let title = soul_storage::tracks::get_by_id(&pool, track_id)
                    .await?
                    .map_or_else(|| "<deleted>".to_string(), |track| track.title);
                println!("  {}  {:>6}  {}", at.format("%Y-%m-%d %H:%M:%S"), track_id, title);
            }
        }
        Commands::Discard { track_id, context } => {
            let context = context.unwrap_or_else(|| config.autodj.default_context.clone());
            let (dj, track) = manual_dj(&registry, &pool, &config, &context, track_id).await?;
            dj.discard(track.id).await?;
            println!("Discarded `{}` from `{context}`", track.title);
        }
        Commands::Insert { track_id, context } => {
            let context = context.unwrap_or_else(|| config.autodj.default_context.clone());
            let (dj, track) = manual_dj(&registry, &pool, &config, &context, track_id).await?;
            dj.insert(track.id).await?;
            println!("Inserted `{}` into `{context}`", track.title);
        }
    }

    Ok(())
}

/// Auto-DJ for `context` plus the existing track a manual edit refers to
async fn manual_dj(
    registry: &ContextRegistry,
    pool: &SqlitePool,
    config: &AutodjConfig,
    context: &str,
    track_id: TrackId,
) -> anyhow::Result<(AutoDj<RandomByTrack>, Track)> {
    let Some(track) = soul_storage::tracks::get_by_id(pool, track_id).await? else {
        anyhow::bail!("Track {track_id} not found");
    };

    let dj = AutoDj::start(
        registry,
        RandomByTrack::new(),
        context,
        Arc::new(LibraryView),
        Arc::new(StoreTrackCache::new(pool.clone())),
        config.lookback(),
    )
    .await?;

    Ok((dj, track))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["soul-autodj", "history", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["soul-autodj", "history", "--limit", "-3"]).is_err());

        let cli = Cli::try_parse_from(["soul-autodj", "history", "-n", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::History { limit: 5, .. }));
    }

    #[test]
    fn discard_takes_track_and_context() {
        let cli = Cli::try_parse_from(["soul-autodj", "discard", "7", "--context", "dj"]).unwrap();
        match cli.command {
            Commands::Discard { track_id, context } => {
                assert_eq!(track_id, 7);
                assert_eq!(context.as_deref(), Some("dj"));
            }
            _ => panic!("expected discard"),
        }
    }
}
