mod commands;
mod summary;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keolapse", about = "All-sky timelapse with a keogram ring overlay")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for per-frame pixel work (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the keolapse video for one night
    Run(commands::run::RunArgs),
    /// Print or save a default config as TOML
    Config(commands::config::ConfigArgs),
    /// Show which frames would be used and at what rate
    Schedule(commands::schedule::ScheduleArgs),
    /// Render ring and frame preview stills without a video
    Preview(commands::preview::PreviewArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
        tracing::debug!(threads, "Worker pool configured");
    }

    match &cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Schedule(args) => commands::schedule::run(args),
        Commands::Preview(args) => commands::preview::run(args),
    }
}
