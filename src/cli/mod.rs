//! CLI command definitions and handlers

mod registry;
mod score;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use netscore::config::{self, NetScoreConfig};
use std::path::{Path, PathBuf};

/// NetScore - trust scoring for open-source packages
#[derive(Parser, Debug)]
#[command(name = "netscore")]
#[command(
    version,
    about = "Trust scores for GitHub and npm packages, plus registry version and size utilities",
    after_help = "\
Examples:
  netscore score urls.txt                  Score every URL, one JSON record per line
  netscore score urls.txt --extended       Also report PinningPractice and CodeReview
  netscore newer 1.9.0 1.10.0              Is the candidate version newer?
  netscore matches ^1.2.0 1.9.9            Does the version satisfy the range?
  netscore cost ./store lodash 4.17.21     Bytes stored for a package and its dependencies
  netscore packages ./store --name lodash  Query stored packages

Environment:
  GITHUB_TOKEN   GitHub token (required by `score`)
  LOG_LEVEL      0 = silent, 1 = info, 2 = debug
  LOG_FILE       Write logs to this file instead of stderr"
)]
pub struct Cli {
    /// Config file (default: ./netscore.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overrides LOG_LEVEL and RUST_LOG
    #[arg(long, global = true, value_parser = ["off", "error", "warn", "info", "debug", "trace"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How `cost` discovers dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeMode {
    /// Infer from the stored key layout
    KeyLayout,
    /// Read each version's stored package.json
    Manifest,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a file of GitHub/npm URLs (one per line)
    Score {
        /// File with one URL per line
        url_file: PathBuf,

        /// Also run PinningPractice and CodeReview (reported, not weighted)
        #[arg(long)]
        extended: bool,

        /// URLs per batch (default: 5)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Print whether CANDIDATE is a newer version than CURRENT
    Newer { current: String, candidate: String },

    /// Print whether VERSION satisfies RANGE (^, ~, a-b, exact, *)
    Matches { range: String, version: String },

    /// Total stored bytes for a package version and its dependencies
    Cost {
        /// Object store root directory
        store_dir: PathBuf,
        name: String,
        version: String,

        #[arg(long, value_enum, default_value_t = EdgeMode::KeyLayout)]
        edges: EdgeMode,
    },

    /// List stored packages, or match them against a name and version range
    Packages {
        /// Object store root directory
        store_dir: PathBuf,

        /// Package name (`*` for all); lists everything when omitted
        #[arg(long)]
        name: Option<String>,

        /// Version range to match
        #[arg(long, default_value = "*")]
        version: String,
    },

    /// Manage configuration (init or show)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create ~/.config/netscore/config.toml with commented defaults
    Init,
    /// Show config file locations and effective settings
    Show,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Score {
            url_file,
            extended,
            batch_size,
        } => score::run(&config, &url_file, extended, batch_size),
        Commands::Newer { current, candidate } => {
            println!("{}", netscore::is_version_newer(&current, &candidate));
            Ok(())
        }
        Commands::Matches { range, version } => {
            println!("{}", netscore::version_matches_range(&range, &version));
            Ok(())
        }
        Commands::Cost {
            store_dir,
            name,
            version,
            edges,
        } => registry::cost(&store_dir, &name, &version, edges),
        Commands::Packages {
            store_dir,
            name,
            version,
        } => registry::packages(&store_dir, name.as_deref(), &version),
        Commands::Config { action } => run_config_action(action, &config, cli.config.as_deref()),
    }
}

fn run_config_action(
    action: ConfigAction,
    config: &NetScoreConfig,
    explicit: Option<&Path>,
) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config::init_user_config()?;
            println!("Config initialized at: {}", path.display());
            println!("\nSet your GitHub token via environment:");
            println!("  export GITHUB_TOKEN=\"ghp_...\"");
            Ok(())
        }
        ConfigAction::Show => {
            show_config(config, explicit);
            Ok(())
        }
    }
}

fn file_status(path: &Path) -> &'static str {
    if path.exists() {
        "(found)"
    } else {
        "(not found)"
    }
}

fn show_config(config: &NetScoreConfig, explicit: Option<&Path>) {
    println!("Config paths:");
    if let Some(user_path) = config::user_config_path() {
        println!("  User:    {} {}", user_path.display(), file_status(&user_path));
    }
    let project = explicit.unwrap_or_else(|| Path::new(config::PROJECT_CONFIG_FILE));
    println!("  Project: {} {}", project.display(), file_status(project));
    println!();

    let w = &config.scoring.weights;
    println!("Scoring:");
    println!(
        "  weights: ramp_up={} correctness={} bus_factor={} responsive_maintainer={}",
        w.ramp_up, w.correctness, w.bus_factor, w.responsive_maintainer
    );
    println!(
        "  contributors: {}..{}",
        config.scoring.min_contributors, config.scoring.max_contributors
    );
    println!("  extended metrics: {}", config.scoring.extended_metrics);
    println!("Batch size: {}", config.batch.size);

    let endpoints = config.http.endpoints();
    println!("HTTP:");
    println!(
        "  timeout {}s, {} retries, {}ms backoff",
        config.http.timeout_secs, config.http.max_retries, config.http.backoff_ms
    );
    println!("  GitHub API: {}", endpoints.github_api);
    println!("  npm registry: {}", endpoints.npm_registry);
    let token_status = if config.github_token.is_some() {
        "set"
    } else {
        "not set"
    };
    println!("  GITHUB_TOKEN: {}", token_status);

    println!("Logging:");
    match config.log_level {
        Some(level) => println!("  LOG_LEVEL: {}", level.directive()),
        None => println!("  LOG_LEVEL: not set (RUST_LOG applies)"),
    }
    match &config.log_file {
        Some(path) => println!("  LOG_FILE: {}", path.display()),
        None => println!("  LOG_FILE: not set (stderr)"),
    }
}
