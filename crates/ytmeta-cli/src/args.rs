use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytmeta")]
#[command(author, version, about = "Video metadata fetching and caching for feed readers")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video IDs or URLs to fetch (shorthand for `fetch <VIDEO>...`)
    #[arg(value_name = "VIDEO")]
    pub videos: Vec<String>,

    /// Re-fetch fields that are already cached
    #[arg(short = 'F', long)]
    pub force: bool,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch metadata for one or more videos
    Fetch {
        /// Video IDs or URLs
        #[arg(required = true, value_name = "VIDEO")]
        videos: Vec<String>,

        #[command(flatten)]
        options: FetchOptions,
    },

    /// Fetch metadata for a file of videos
    Batch {
        /// File containing video IDs or URLs (one per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum concurrently fetched items
        #[arg(short, long)]
        parallel: Option<usize>,

        #[command(flatten)]
        options: FetchOptions,
    },

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone)]
pub struct FetchOptions {
    /// Re-fetch fields that are already cached
    #[arg(short = 'F', long)]
    pub force: bool,

    /// Caption language preference, best first (repeatable)
    #[arg(short, long = "language", value_name = "LANGUAGE")]
    pub languages: Vec<String>,

    /// Fixed mirror base URL, bypassing instance discovery
    #[arg(long, value_name = "URL")]
    pub mirror: Option<String>,

    /// Persist fetched records to the durable store
    #[arg(long)]
    pub persist: bool,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}
