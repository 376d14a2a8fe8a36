use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;

#[derive(Parser)]
#[command(name = "dayplan", version, about = "Day planning CLI")]
struct Cli {
    /// Config file (defaults to $DAYPLAN_CONFIG, then ~/.config/dayplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work windows for a local date range
    Windows(commands::calendar::WindowsArgs),
    /// Merged busy blocks and statistics
    Busy(commands::calendar::BusyArgs),
    /// Changes between a stored fingerprint and current events
    Diff(commands::calendar::DiffArgs),
    /// Fill content hashes of events
    Hash(commands::calendar::HashArgs),
    /// Score tasks
    Score(commands::planner::ScoreArgs),
    /// Capacity projection for one day
    Capacity(commands::planner::CapacityArgs),
    /// Ranked plan for today and tomorrow
    Plan(commands::planner::PlanArgs),
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // stdout carries JSON only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let result = settings::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Windows(args) => commands::calendar::windows(args, &config),
        Commands::Busy(args) => commands::calendar::busy(args, &config),
        Commands::Diff(args) => commands::calendar::diff(args),
        Commands::Hash(args) => commands::calendar::hash(args),
        Commands::Score(args) => commands::planner::score(args, &config),
        Commands::Capacity(args) => commands::planner::capacity(args, &config),
        Commands::Plan(args) => commands::planner::plan(args, &config),
        Commands::Config { action } => commands::config::run(action, &config),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
