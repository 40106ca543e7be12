//! Laurel CLI: score OSM completeness for a list of administrative places.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use laurel::cache::FsCache;
use laurel::config::Config;
use laurel::geocode::UnconfiguredGeocoder;
use laurel::pipeline;

#[derive(Parser, Debug)]
#[command(name = "laurel")]
#[command(about = "Score OSM completeness for administrative places")]
struct Args {
    /// Place list: one place per line, 4 name segments optionally
    /// followed by "lon lat"
    place_list: Vec<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "feature_comprehensiveness_statistics.csv")]
    output: PathBuf,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cache directory (overrides config)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Skip all network activity; use cached data only
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to initialize logging");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();

    // Any positional count other than exactly one gets usage help and
    // a clean exit, surplus arguments included.
    let Some(place_list) = single_place_list(&args.place_list) else {
        print_usage();
        return ExitCode::SUCCESS;
    };
    let place_list = place_list.clone();

    match execute(place_list, args.output, args.config, args.cache_dir, args.offline).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    place_list: PathBuf,
    output: PathBuf,
    config_file: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    offline: bool,
) -> Result<()> {
    let mut config = match config_file {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cache_dir {
        config.cache_dir = dir;
    }
    if offline {
        config.offline = true;
    }

    let cache = FsCache::new(config.cache_dir.clone())?;
    pipeline::run(&place_list, &output, &config, &cache, &UnconfiguredGeocoder).await
}

/// Select the place list when exactly one was given.
fn single_place_list(paths: &[PathBuf]) -> Option<&PathBuf> {
    match paths {
        [one] => Some(one),
        _ => None,
    }
}

fn print_usage() {
    let mut cmd = Args::command();
    let _ = cmd.print_help();
    println!();
    println!("Example of record in place_list:");
    println!(" 安徽省 合肥市 瑶海区 明光路街道 117.3016267 31.8584716");
    println!(" 安徽省 合肥市 瑶海区 胜利路街道 117.2963607 31.8650544");
    println!();
}
