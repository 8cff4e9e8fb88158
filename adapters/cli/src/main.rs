#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays, simulates and inspects Keyfall charts.

mod config;
mod library;
mod play;
mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use keyfall_core::Lane;
use keyfall_system_chart::{lane_distribution, LaneStrategy, PreparedChart};
use log::LevelFilter;

use crate::{
    config::GameConfig,
    simulate::{simulate, BotProfile},
};

#[derive(Debug, Parser)]
#[command(name = "keyfall", about = "Four-lane rhythm game timing and grading engine")]
struct Cli {
    /// Optional TOML file with [engine], [gameplay] and [visuals] tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How chart notes are mapped onto lanes.
    #[arg(long, global = true, default_value_t = LaneStrategy::default())]
    lanes: LaneStrategy,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the game window with the given charts on the song menu.
    Play {
        /// Chart JSON files.
        #[arg(required = true)]
        charts: Vec<PathBuf>,
        /// Render as fast as possible instead of waiting for vertical sync.
        #[arg(long)]
        no_vsync: bool,
    },
    /// Play a chart headlessly with a bot and print the end-of-song summary.
    Simulate {
        /// Chart JSON file.
        chart: PathBuf,
        /// Standard deviation of the bot's timing error in milliseconds.
        #[arg(long, default_value_t = 25.0)]
        jitter_ms: f64,
        /// Probability that the bot ignores a note.
        #[arg(long, default_value_t = 0.05)]
        skip_rate: f64,
        /// Seed for the bot; defaults to the chart fingerprint.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a chart's song entry and lane distribution.
    Inspect {
        /// Chart JSON file.
        chart: PathBuf,
    },
}

/// Entry point for the Keyfall command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GameConfig::load(cli.config.as_deref())?;
    let thinning = config.gameplay.thinning();

    match cli.command {
        Command::Play { charts, no_vsync } => {
            let library = library::load_library(&charts, cli.lanes, &thinning);
            play::run(library, config, !no_vsync)
        }
        Command::Simulate {
            chart,
            jitter_ms,
            skip_rate,
            seed,
        } => {
            let chart = library::load_chart(&chart, cli.lanes, &thinning)?;
            let profile = BotProfile {
                jitter_ms,
                skip_rate,
                seed: seed.unwrap_or_else(|| chart.entry.fingerprint.get()),
            };
            let summary = simulate(&chart, &config, &profile)
                .with_context(|| format!("failed to simulate '{}'", chart.entry.name))?;
            println!("{summary}");
            Ok(())
        }
        Command::Inspect { chart } => {
            let chart = library::load_chart(&chart, cli.lanes, &thinning)?;
            println!("{}", describe_chart(&chart, cli.lanes));
            Ok(())
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn describe_chart(chart: &PreparedChart, strategy: LaneStrategy) -> String {
    let entry = &chart.entry;
    let distribution = lane_distribution(&chart.notes);
    let lanes: Vec<String> = Lane::ALL
        .iter()
        .zip(distribution)
        .map(|(lane, count)| format!("{lane}={count}"))
        .collect();

    format!(
        "{}\n  bpm          {:.1}\n  duration     {:.2}s\n  notes        {}\n  difficulty   {}\n  fingerprint  {}\n  lanes ({strategy})  {}",
        entry.name,
        entry.bpm,
        entry.duration,
        entry.total_notes,
        entry.difficulty,
        entry.fingerprint,
        lanes.join(" ")
    )
}
