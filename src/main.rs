use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use padel_stats::api::{build_router, cors_layer, state::AppState};
use padel_stats::calculate::{rank, ReportSnapshot, StatsEngine, StatsFilter};
use padel_stats::config::AppConfig;
use padel_stats::ingest;
use padel_stats::models::{DateRange, MatchRecord};
use padel_stats::storage::{
    dedup_by_id, read_matches, write_matches, EntityType, JsonlWriter, StorageConfig,
};
use padel_stats::{parse_date, parse_player_list};

#[derive(Parser)]
#[command(name = "padel-stats")]
#[command(about = "Match statistics, rankings, badges and insights for a padel club")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Comma-separated players to restrict to
    #[arg(long)]
    players: Option<String>,

    /// Reference day for monthly insights (default: today)
    #[arg(long)]
    today: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a database export into normalized storage
    Import {
        /// Path to the JSON export
        #[arg(long)]
        input: PathBuf,

        /// Replace stored matches instead of merging by id
        #[arg(long)]
        replace: bool,

        /// Parse and report but don't store
        #[arg(long)]
        dry_run: bool,
    },

    /// Per-player statistics
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Per-pair statistics
    Pairs {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Leaderboard by efficiency then games won
    Ranking {
        /// Rank pairs instead of players
        #[arg(long)]
        pairs: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Badge tiers and progress
    Badges {
        /// Only show this player
        #[arg(long)]
        player: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Period and month-over-month insights
    Insights {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Compute the full report and append it to the derived history
    Derive {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl FilterArgs {
    fn date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
        value
            .map(|v| {
                parse_date(v)
                    .with_context(|| format!("Invalid --{} date (expected YYYY-MM-DD): {}", name, v))
            })
            .transpose()
    }

    fn stats_filter(&self) -> Result<StatsFilter> {
        let from = Self::date("from", self.from.as_deref())?;
        let to = Self::date("to", self.to.as_deref())?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                bail!("--from ({}) must not be after --to ({})", f, t);
            }
        }

        let filter = StatsFilter::new(DateRange::new(from, to));
        Ok(match self.players.as_deref().map(parse_player_list) {
            Some(players) if !players.is_empty() => filter.with_players(players),
            _ => filter,
        })
    }

    fn today(&self) -> Result<NaiveDate> {
        Ok(Self::date("today", self.today.as_deref())?.unwrap_or_else(|| Utc::now().date_naive()))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Stored matches and an engine over the configured (or discovered) roster.
fn load(config: &AppConfig, storage: &StorageConfig) -> Result<(Vec<MatchRecord>, StatsEngine)> {
    let records = read_matches(storage).context("Failed to read stored matches")?;
    tracing::info!("Loaded {} matches from {:?}", records.len(), storage.data_dir);
    let engine = StatsEngine::new(config.roster.clone(), config.achievements.clone())
        .with_discovered_roster(&records);
    Ok((records, engine))
}

fn import(storage: &StorageConfig, input: &Path, replace: bool, dry_run: bool) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read export {:?}", input))?;
    let result = ingest::parse_export(&raw)?;

    println!("\n=== Import Results ===");
    println!("Records parsed:   {}", result.records.len());
    println!("Entries skipped:  {}", result.skipped);
    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if dry_run {
        println!("\n(dry run - no data written to disk)");
        return Ok(());
    }

    let mut records = if replace {
        result.records
    } else {
        let mut existing = read_matches(storage)?;
        existing.extend(result.records);
        dedup_by_id(existing, |r| r.id.clone())
    };
    let written = write_matches(storage, &mut records)?;

    let raw_copy = storage
        .raw_dir()
        .join(format!("export-{}.json", Utc::now().format("%Y%m%dT%H%M%S")));
    std::fs::create_dir_all(storage.raw_dir())?;
    std::fs::write(&raw_copy, raw)?;

    println!("Matches stored:   {}", written);
    tracing::info!("Saved raw export to {:?}", raw_copy);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(Path::new(&cli.config))
        .with_context(|| format!("Failed to load config {}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting padel-stats v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Import {
            input,
            replace,
            dry_run,
        } => import(&storage, &input, replace, dry_run)?,
        Commands::Stats { filter } => {
            let (records, engine) = load(&config, &storage)?;
            let players = engine.player_stats(&records, &filter.stats_filter()?);
            if filter.json {
                return print_json(&players);
            }
            println!(
                "{:<20} {:>5} {:>5} {:>5} {:>6} {:>6} {:>8} {:>5} {:>5} {:>5}",
                "Player", "GP", "W", "L", "SW", "SL", "Eff%", "Cur", "Best", "Prt"
            );
            for p in players.values() {
                println!(
                    "{:<20} {:>5} {:>5} {:>5} {:>6} {:>6} {:>8.2} {:>5} {:>5} {:>5}",
                    p.name,
                    p.games_played,
                    p.games_won,
                    p.games_lost,
                    p.sets_won,
                    p.sets_lost,
                    p.efficiency,
                    p.current_streak,
                    p.longest_streak,
                    p.partner_count()
                );
            }
        }
        Commands::Pairs { filter } => {
            let (records, engine) = load(&config, &storage)?;
            let pairs = engine.pair_stats(&records, &filter.stats_filter()?);
            if filter.json {
                return print_json(&pairs);
            }
            println!(
                "{:<32} {:>5} {:>5} {:>5} {:>8} {:>5}",
                "Pair", "GP", "W", "L", "Eff%", "Best"
            );
            for p in pairs.values() {
                println!(
                    "{:<32} {:>5} {:>5} {:>5} {:>8.2} {:>5}",
                    p.key.as_str(),
                    p.games_played,
                    p.games_won,
                    p.games_lost,
                    p.efficiency,
                    p.longest_streak
                );
            }
        }
        Commands::Ranking { pairs, filter } => {
            let (records, engine) = load(&config, &storage)?;
            let stats_filter = filter.stats_filter()?;
            if pairs {
                let ranking = rank(engine.pair_stats(&records, &stats_filter).values());
                if filter.json {
                    return print_json(&ranking);
                }
                for entry in &ranking {
                    println!(
                        "{:>3}. {:<32} {:>8.2}% {:>4} won{}",
                        entry.position,
                        entry.stat.key.as_str(),
                        entry.stat.efficiency,
                        entry.stat.games_won,
                        if entry.tied_with_first { "  *" } else { "" }
                    );
                }
            } else {
                let ranking = rank(engine.player_stats(&records, &stats_filter).values());
                if filter.json {
                    return print_json(&ranking);
                }
                for entry in &ranking {
                    println!(
                        "{:>3}. {:<20} {:>8.2}% {:>4} won{}",
                        entry.position,
                        entry.stat.name,
                        entry.stat.efficiency,
                        entry.stat.games_won,
                        if entry.tied_with_first { "  *" } else { "" }
                    );
                }
            }
        }
        Commands::Badges { player, filter } => {
            let (records, engine) = load(&config, &storage)?;
            let mut players = engine.player_stats(&records, &filter.stats_filter()?);
            if let Some(name) = &player {
                players.retain(|n, _| n == name);
                if players.is_empty() {
                    bail!("Unknown player: {}", name);
                }
            }
            let achievements = engine.achievements(&players);
            if filter.json {
                return print_json(&achievements);
            }
            for (name, statuses) in &achievements {
                println!("{}", name);
                for status in statuses.values() {
                    let tier = status
                        .tier
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    let note = if status.not_eligible {
                        " (not eligible yet)"
                    } else {
                        ""
                    };
                    println!(
                        "  {:<16} {:<7} {:>8.2} -> {:>6.2} ({:.0}%){}",
                        status.metric.label(),
                        tier,
                        status.value,
                        status.next_threshold,
                        status.progress,
                        note
                    );
                }
            }
        }
        Commands::Insights { filter } => {
            let (records, engine) = load(&config, &storage)?;
            let insights = engine.insights(&records, &filter.stats_filter()?, filter.today()?);
            if filter.json {
                return print_json(&insights);
            }
            if insights.is_empty() {
                println!("No insights for this period.");
            }
            for insight in &insights {
                println!("- {}", insight);
            }
        }
        Commands::Derive { filter } => {
            let (records, engine) = load(&config, &storage)?;
            let report = engine.report(&records, &filter.stats_filter()?, filter.today()?);
            let snapshot = ReportSnapshot::new(report);

            let writer = JsonlWriter::<ReportSnapshot>::for_entity(&storage, EntityType::Report);
            writer.append(&snapshot)?;

            if filter.json {
                return print_json(&snapshot);
            }
            println!("\n=== Derived Report ===");
            println!("Matches:          {}", snapshot.report.match_count);
            println!("Players:          {}", snapshot.report.players.len());
            println!("Pairs:            {}", snapshot.report.pairs.len());
            println!("Insights:         {}", snapshot.report.insights.len());
            println!("Appended to:      {:?}", writer.path());
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let engine = StatsEngine::new(config.roster.clone(), config.achievements.clone());
            let app = build_router(AppState::new(storage, engine))
                .layer(cors_layer(&config.server.cors_origin));
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
