// src/main.rs

//! herald CLI
//!
//! Watches a YouTube channel's tabs and announces new uploads to Discord.

use clap::{Parser, Subcommand};
use log::info;

use herald::error::Result;
use herald::models::{Category, Config};
use herald::pipeline::{DiscordAnnouncer, Watcher};
use herald::services::{ChannelListing, VideoSource};

/// herald - Channel upload announcer
#[derive(Parser, Debug)]
#[command(name = "herald", version, about = "Announces new channel uploads to Discord")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the channel and announce new uploads until killed
    Watch,

    /// Fetch and print the listed video IDs for one category
    List {
        /// Category to list (videos, shorts, or streams)
        category: Category,

        /// Cap the fetch to the N most recent items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Load and validate the configuration file, then exit
    Validate,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Watch => run_watch(&config).await?,
        Command::List { category, limit } => run_list(&config, category, limit).await?,
        Command::Validate => {
            info!("Configuration OK: watching '{}'.", config.channel);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

/// Baseline the known set, then scan forever.
async fn run_watch(config: &Config) -> Result<()> {
    let source = ChannelListing::new(&config.channel, &config.listing)?;
    let sink = DiscordAnnouncer::new(&config.token, &config.delivery)?;

    let mut watcher = Watcher::new(config, &source, &sink);
    watcher.baseline().await?;
    watcher.run().await
}

/// Fetch one category's listing and print its IDs.
async fn run_list(config: &Config, category: Category, limit: Option<usize>) -> Result<()> {
    let source = ChannelListing::new(&config.channel, &config.listing)?;
    let ids = source.fetch_ids(category, limit).await?;

    info!("Listed {} video IDs for '{category}'.", ids.len());
    for id in &ids {
        println!("{id}");
    }
    Ok(())
}
