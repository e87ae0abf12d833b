//! fr24: poll a local Flightradar24 flights feed from the command line.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use fr24_client::args::FeedArgs;
use fr24_client::render;
use fr24_core::config::{self, FileConfig};
use fr24_core::{feed_url, Result};

#[derive(Parser)]
#[command(
    name = "fr24",
    version,
    about = "Nearby aircraft from a local Flightradar24 feed"
)]
struct Cli {
    /// Config file (defaults to ~/.fr24-feed/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll once and print nearby aircraft
    Once {
        #[command(flatten)]
        feed: FeedArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Poll repeatedly, printing aircraft after every update
    Watch {
        #[command(flatten)]
        feed: FeedArgs,

        /// Seconds between polls (defaults to the config file value)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many polls
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },

    /// Show the effective configuration
    Config {
        #[command(flatten)]
        feed: FeedArgs,

        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Once { feed, json } => cmd_once(cli.config, &feed, json),
        Commands::Watch {
            feed,
            interval,
            count,
        } => cmd_watch(cli.config, &feed, interval, count),
        Commands::Config { feed, save } => cmd_config(cli.config, &feed, save),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Config file merged with command-line overrides.
fn effective_config(path: Option<PathBuf>, args: &FeedArgs) -> Result<FileConfig> {
    let mut file = match path {
        Some(p) if p.exists() => config::load_config_from(&p)?,
        Some(p) => {
            warn!("{} not found, using defaults", p.display());
            FileConfig::default()
        }
        None => config::load_config(),
    };
    args.apply(&mut file);
    Ok(file)
}

fn cmd_once(path: Option<PathBuf>, args: &FeedArgs, json: bool) -> Result<()> {
    let file = effective_config(path, args)?;
    let mut aggregator = fr24_client::connect(&file.to_feed_config()?)?;

    let snapshot = aggregator.update()?;
    if json {
        println!("{}", render::entries_json(&snapshot)?);
    } else {
        println!("{} aircraft", snapshot.len());
        if !snapshot.is_empty() {
            println!("{}", render::entries_table(&snapshot));
        }
    }
    Ok(())
}

fn cmd_watch(
    path: Option<PathBuf>,
    args: &FeedArgs,
    interval: Option<u64>,
    count: Option<u64>,
) -> Result<()> {
    let file = effective_config(path, args)?;
    let mut aggregator = fr24_client::connect(&file.to_feed_config()?)?;
    let interval = Duration::from_secs(interval.unwrap_or(file.poll_interval_secs).max(1));

    info!("polling {} every {}s", aggregator.feed().url(), interval.as_secs());

    let mut polls = 0u64;
    loop {
        // Failures are already logged by the feed; keep polling.
        if let Ok(snapshot) = aggregator.update() {
            println!();
            println!(
                "{} aircraft, {} callsigns remembered",
                snapshot.len(),
                aggregator.callsigns().len()
            );
            if !snapshot.is_empty() {
                println!("{}", render::entries_table(&snapshot));
            }
        }

        polls += 1;
        if count.is_some_and(|c| polls >= c) {
            break;
        }
        thread::sleep(interval);
    }
    Ok(())
}

fn cmd_config(path: Option<PathBuf>, args: &FeedArgs, save: bool) -> Result<()> {
    let file = effective_config(path.clone(), args)?;

    println!();
    println!(
        "  Home:        {}",
        match (file.home.lat, file.home.lon) {
            (Some(lat), Some(lon)) => format!("{lat}, {lon}"),
            _ => "(not set)".into(),
        }
    );
    println!(
        "  Radius:      {}",
        file.filter
            .radius_km
            .map(|r| format!("{r} km"))
            .unwrap_or("(none)".into())
    );
    println!("  Feed:        {}", feed_url(&file.feed.host, file.feed.port));
    println!("  Timeout:     {}s", file.feed.timeout_secs);
    println!("  History:     {}", file.aggregator.history_depth);
    println!("  Callsigns:   {}", file.aggregator.callsign_policy);
    println!("  Poll every:  {}s", file.poll_interval_secs);
    println!();

    if save {
        let written = match path {
            Some(p) => {
                config::save_config_to(&p, &file)?;
                p
            }
            None => config::save_config(&file)?,
        };
        info!("saved {}", written.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
