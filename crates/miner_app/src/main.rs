//! `miner`: wiki item crawler and game shop extractor.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use miner_engine::MinerConfig;
use miner_logging::{LevelFilter, LogDestination};

mod cmd;

#[derive(Parser)]
#[command(name = "miner")]
#[command(about = "Mine AQW wiki items and game shops")]
#[command(version)]
struct Cli {
    /// RON config file; missing file means defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory, overrides the config
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the catalog of one item type and mine every item in worker processes
    MineItems {
        /// Catalog path on the wiki, e.g. `swords`
        item_type: String,

        /// Number of listing pages to walk (capped at 30)
        page_count: u32,

        /// Upper bound on concurrent workers, overrides the config
        #[arg(long)]
        max_concurrency: Option<usize>,
    },

    /// Mine a single item page into the document store
    MineItemData {
        /// Item slug, e.g. `blade-of-awe`
        slug: String,
    },

    /// Load shops over a decoded-event relay and append them to the CSV tables
    ExtractShopItems {
        /// Relay address, `host:port`
        relay_addr: String,

        /// Comma separated shop ids, e.g. `1,23,456`
        shop_ids: String,
    },
}

/// Settings shared by every subcommand.
pub struct AppContext {
    pub config: MinerConfig,
    /// Global flags a worker process must be started with.
    pub worker_args: Vec<OsString>,
}

/// Workers see the same config and output dir as the parent, but log to
/// their captured terminal only.
fn worker_args(config: Option<&Path>, output_dir: &Path) -> Vec<OsString> {
    let mut args = Vec::new();
    if let Some(path) = config {
        args.push(OsString::from("--config"));
        args.push(path.as_os_str().to_os_string());
    }
    args.push(OsString::from("--output"));
    args.push(output_dir.as_os_str().to_os_string());
    args
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    miner_logging::initialize(destination, level);

    let mut config = MinerConfig::load_or_default(cli.config.as_deref())?;
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }

    let ctx = AppContext {
        worker_args: worker_args(cli.config.as_deref(), &config.output_dir),
        config,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    match cli.command {
        Commands::MineItems {
            item_type,
            page_count,
            max_concurrency,
        } => runtime.block_on(cmd::mine_items::run(
            ctx,
            &item_type,
            page_count,
            max_concurrency,
        )),
        Commands::MineItemData { slug } => runtime.block_on(cmd::mine_item_data::run(ctx, &slug)),
        Commands::ExtractShopItems {
            relay_addr,
            shop_ids,
        } => cmd::extract_shop_items::run(ctx, &relay_addr, &shop_ids),
    }
}
