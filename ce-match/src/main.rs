//! ce-match - Performer and tag reconciliation tool
//!
//! Reads already-fetched catalog, Stashapp and StashDB records as JSON,
//! runs the matching engine and writes the report as JSON (stdout unless
//! `--output` is given). Logs go to stderr.

use anyhow::{bail, Context, Result};
use ce_common::config::{default_config_path, load_config, write_toml_config, TomlConfig};
use ce_match::io::{read_json, read_scenes, write_json};
use ce_match::tags::{CeTag, StashappTag};
use ce_match::{
    CrossSourceReconciler, LocalPerformer, Roster, StashappPerformer, TagAnalyzer,
    UnmatchedReconciler,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ce-match", version, about = "Reconcile Culture Extractor performers and tags with Stashapp and StashDB")]
struct Cli {
    /// Config file (defaults to CE_MATCH_CONFIG, then ~/.config/culture-extractor/ce-match.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Match scene casts across Stashapp, StashDB and the global roster
    Reconcile {
        /// Scene batch (scene records or aligned collections)
        #[arg(long, value_name = "FILE")]
        scenes: PathBuf,
        /// Global Stashapp roster; omitting it skips the global round
        #[arg(long, value_name = "FILE")]
        roster: Option<PathBuf>,
        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Shard scenes across threads (requires the `parallel` feature)
        #[arg(long)]
        parallel: bool,
    },

    /// Suggest roster matches for performers nothing else matched
    Unmatched {
        /// List of local performers (`local_id`, `local_name`)
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Global Stashapp roster
        #[arg(long, value_name = "FILE")]
        roster: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compare catalog tags with Stashapp tags
    Tags {
        /// Catalog tags
        #[arg(long, value_name = "FILE")]
        ce: PathBuf,
        /// Stashapp tags
        #[arg(long, value_name = "FILE")]
        stash: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCmd,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    /// Write a config file with default thresholds
    Init {
        /// Target path (defaults to the platform config directory)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Report wrapper written to disk or stdout
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    version: &'static str,
    report: &'a T,
}

fn emit<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    let envelope = Envelope {
        generated_at: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        report,
    };
    write_json(&envelope, output).context("Failed to write report")?;
    if let Some(path) = output {
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn load_roster(path: &Path, config: &TomlConfig) -> Result<Roster> {
    let performers: Vec<StashappPerformer> = read_json(path)
        .with_context(|| format!("Failed to read roster {}", path.display()))?;
    info!(performers = performers.len(), "Loaded Stashapp roster");
    Ok(Roster::new(performers, config.external_endpoint.as_str()))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, origin) =
        load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level);

    info!("Starting ce-match v{}", env!("CARGO_PKG_VERSION"));
    origin.log();

    match cli.command {
        Commands::Reconcile {
            scenes,
            roster,
            output,
            parallel,
        } => {
            let scenes = read_scenes(&scenes)
                .with_context(|| format!("Failed to read scenes {}", scenes.display()))?;
            let roster = match roster {
                Some(path) => load_roster(&path, &config)?,
                None => {
                    info!("No roster given, global round disabled");
                    Roster::empty(config.external_endpoint.as_str())
                }
            };
            info!(scenes = scenes.len(), "Reconciling scene batch");

            let reconciler = CrossSourceReconciler::new(roster, config.matcher.clone());
            let report = if parallel {
                run_parallel(&reconciler, &scenes)
            } else {
                reconciler.reconcile(&scenes)
            };
            emit(&report, output.as_deref())
        }

        Commands::Unmatched {
            input,
            roster,
            output,
        } => {
            let unmatched: Vec<LocalPerformer> = read_json(&input)
                .with_context(|| format!("Failed to read unmatched list {}", input.display()))?;
            let roster = load_roster(&roster, &config)?;

            let reconciler = UnmatchedReconciler::new(roster, config.matcher.clone());
            let suggestions = reconciler.reconcile(&unmatched);
            emit(&suggestions, output.as_deref())
        }

        Commands::Tags { ce, stash, output } => {
            let ce_tags: Vec<CeTag> = read_json(&ce)
                .with_context(|| format!("Failed to read catalog tags {}", ce.display()))?;
            let stash_tags: Vec<StashappTag> = read_json(&stash)
                .with_context(|| format!("Failed to read Stashapp tags {}", stash.display()))?;

            let analyzer = TagAnalyzer::new(stash_tags, config.matcher.clone());
            let analysis = analyzer.analyze(&ce_tags);
            emit(&analysis, output.as_deref())
        }

        Commands::Config {
            command: ConfigCmd::Init { path, force },
        } => {
            let Some(path) = path.or_else(default_config_path) else {
                bail!("Could not determine config directory; pass --path");
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            write_toml_config(&TomlConfig::default(), &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}

#[cfg(feature = "parallel")]
fn run_parallel(
    reconciler: &CrossSourceReconciler,
    scenes: &[ce_match::SceneInput],
) -> ce_match::ReconcileReport {
    reconciler.reconcile_parallel(scenes)
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    reconciler: &CrossSourceReconciler,
    scenes: &[ce_match::SceneInput],
) -> ce_match::ReconcileReport {
    tracing::warn!("Built without the `parallel` feature, reconciling sequentially");
    reconciler.reconcile(scenes)
}
