//! Command-line front end for the rating engine
//!
//! Evaluates engine calls with the configured rating model and prints the
//! result as JSON on stdout. Logs go to stderr.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use pong_ladder::config::{validate_config, AppConfig, RatingModel};
use pong_ladder::rating::{
    expected_score, rd_with_inactivity, EloRatingCalculator, InactivityPolicy, RatingCalculator,
};
use pong_ladder::types::BulkReplayOrder;
use pong_ladder::utils::current_timestamp;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Pong Ladder - Elo ratings for office ping-pong
#[derive(Parser)]
#[command(
    name = "pong-ladder",
    version,
    about = "Elo rating engine for ping-pong ladders",
    long_about = "Computes expected scores, single-match and bulk rating updates, and \
                 rating-deviation growth using either a fixed K-factor or a K-factor \
                 scaled by each player's rating deviation."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Rating model override
    #[arg(
        short,
        long,
        global = true,
        value_name = "MODEL",
        help = "Override rating model (fixed, rd-scaled)"
    )]
    model: Option<RatingModel>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expected score and win probability of one rating against another
    Expected { rating: f64, opponent: f64 },

    /// Ratings after a single game
    Update {
        winner: f64,
        loser: f64,
        #[arg(long)]
        winner_rd: Option<f64>,
        #[arg(long)]
        loser_rd: Option<f64>,
    },

    /// Ratings after a batch of games between two players
    Bulk {
        rating_a: f64,
        rating_b: f64,
        wins_a: u32,
        wins_b: u32,
        #[arg(long, default_value = "wins-a-first")]
        order: BulkReplayOrder,
    },

    /// RD after a number of days without a match
    Inactivity {
        rd: f64,
        #[arg(long)]
        days: i64,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Serialize)]
struct ExpectedOutput {
    expected_score: f64,
    win_probability: u8,
}

#[derive(Debug, PartialEq, Serialize)]
struct InactivityOutput {
    rd: f64,
    days: i64,
    new_rd: f64,
}

/// RD of a player idle for `days` whole days as of `now`
fn inactivity_output(
    rd: f64,
    days: i64,
    now: DateTime<Utc>,
    policy: &InactivityPolicy,
) -> Result<InactivityOutput> {
    let last_played = Duration::try_days(days)
        .and_then(|idle| now.checked_sub_signed(idle))
        .ok_or_else(|| anyhow!("--days {} is out of range", days))?;

    Ok(InactivityOutput {
        rd,
        days,
        new_rd: rd_with_inactivity(rd, Some(last_played), now, policy),
    })
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file or environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        let mut config = AppConfig::from_file(config_path)?;
        config.apply_env()?;
        config
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(model) = args.model {
        config.rating.model = model;
    }

    validate_config(&config)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: &AppConfig) -> Result<()> {
    let calculator = EloRatingCalculator::new(config.rating.engine_config())?;

    match command {
        Command::Expected { rating, opponent } => print_json(&ExpectedOutput {
            expected_score: expected_score(rating, opponent),
            win_probability: calculator.win_probability(rating, opponent),
        }),
        Command::Update {
            winner,
            loser,
            winner_rd,
            loser_rd,
        } => {
            let update = calculator.update_ratings_with_rd(winner, loser, winner_rd, loser_rd);
            debug!("K-factors: winner {}, loser {}", update.winner_k, update.loser_k);
            print_json(&update)
        }
        Command::Bulk {
            rating_a,
            rating_b,
            wins_a,
            wins_b,
            order,
        } => {
            let outcome =
                calculator.process_bulk_match_results(rating_a, rating_b, wins_a, wins_b, order);
            print_json(&outcome)
        }
        Command::Inactivity { rd, days } => print_json(&inactivity_output(
            rd,
            days,
            current_timestamp(),
            &config.rating.inactivity(),
        )?),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        "{} using {} rating model",
        config.service.name, config.rating.model
    );

    run(args.command, &config)
}
