use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

mod config;
mod parcels;
mod registry;
mod run;

#[derive(Parser)]
#[command(name = "setback-cli")]
#[command(about = "Building setback measurement against parcel boundaries")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    /// Threads (0 = auto)
    #[arg(long, global = true, default_value = "0")]
    threads: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure setbacks for every building in the candidate table
    Run(RunArgs),

    /// Decompose parcel polygons into a flagged segment table
    Registry {
        /// Parcel table (`parcel_id,wkt`)
        #[arg(long)]
        parcels: PathBuf,

        /// Output segment table
        #[arg(short, long)]
        out: PathBuf,

        /// Also write the parcel membership table
        #[arg(long)]
        members_out: Option<PathBuf>,

        /// Also write the segments as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Coordinate tolerance for identical segments
        #[arg(long, default_value = "1e-6")]
        tolerance: f64,
    },
}

/// Table paths given on the command line override the config file
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// TOML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    segments: Option<PathBuf>,

    #[arg(long, conflicts_with = "segments")]
    parcels: Option<PathBuf>,

    #[arg(long)]
    buildings: Option<PathBuf>,

    #[arg(long)]
    members: Option<PathBuf>,

    #[arg(long)]
    candidates: Option<PathBuf>,

    #[arg(long)]
    streets: Option<PathBuf>,

    /// Output record table
    #[arg(long)]
    records: Option<PathBuf>,

    /// Output summary table
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Output summary document (JSON)
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Records with more filled slots than this are dropped
    #[arg(long)]
    max_sides: Option<usize>,
}

/// Sizes the global rayon pool; 0 keeps rayon's default
fn init_thread_pool(threads: usize) -> bool {
    if threads == 0 {
        return true;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Could not configure {threads} worker threads: {e}");
            false
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(cli.log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    init_thread_pool(cli.threads);

    match cli.command {
        Commands::Run(args) => run::cmd_run(&args),
        Commands::Registry {
            parcels,
            out,
            members_out,
            geojson,
            tolerance,
        } => registry::cmd_registry(&parcels, &out, members_out.as_deref(), geojson.as_deref(), tolerance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_pool_is_configured_once() {
        assert!(init_thread_pool(0));
        // The first sizing may already be taken by earlier parallel work
        init_thread_pool(2);
        assert!(!init_thread_pool(3));
    }
}
