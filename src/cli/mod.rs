pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::aggregator::DEFAULT_WORKERS;

#[derive(Parser)]
#[command(name = "estuary")]
#[command(about = "An RSS/Atom feed aggregator", long_about = None)]
pub struct Cli {
    /// Data directory holding feeds.json and the feed cache
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, global = true)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List subscribed feeds and settings
    Feeds,
    /// Show a page of the merged article timeline
    Articles {
        /// Comma-separated feed ids (default: all feeds)
        #[arg(long)]
        feeds: Option<String>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Items per page (default: the stored setting)
        #[arg(long)]
        per_page: Option<usize>,
        /// Case-insensitive filter on title and description
        #[arg(long)]
        search: Option<String>,
    },
    /// Subscribe to a feed
    Add {
        /// URL of the feed to add
        url: String,
        /// Display title (default: the feed's own title)
        #[arg(long)]
        title: Option<String>,
        /// Category used for grouping and OPML export
        #[arg(long, default_value = "Uncategorized")]
        category: String,
        /// Icon shown next to the feed's items
        #[arg(long, default_value = "📰")]
        icon: String,
    },
    /// Unsubscribe from a feed and drop its cache record
    Remove {
        /// Id of the feed to remove
        id: String,
    },
    /// Refetch a feed immediately, bypassing the cache TTL
    Refresh {
        /// Id of the feed to refresh
        id: String,
    },
    /// Show or update settings
    Settings {
        /// Minutes a cached feed stays fresh
        #[arg(long)]
        cache_minutes: Option<u64>,
        /// Timeline page size
        #[arg(long)]
        items_per_page: Option<usize>,
    },
    /// Export the feed list as OPML
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
