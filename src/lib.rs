//! # Estuary
//!
//! An RSS/Atom feed aggregator: many streams, one mouth.
//!
//! ## Architecture
//!
//! Estuary follows a pipeline architecture:
//!
//! ```text
//! Fetcher → Parser → Normalizer → Cache → Aggregator
//! ```
//!
//! - [`fetcher`]: HTTP client behind an async trait
//! - [`parser`]: RSS/Atom document recognition and parsing
//! - [`normalizer`]: converts raw items/entries into unified [`domain::Item`]s
//! - [`cache`]: per-feed on-disk TTL cache with stale fallback
//! - [`aggregator`]: merges cached feeds into one searchable, paginated timeline
//!
//! ## Quick Start
//!
//! ```bash
//! # Subscribe to a feed
//! estuary add https://blog.rust-lang.org/feed.xml --category Rust
//!
//! # Read the merged timeline
//! estuary articles --page 1 --search rust
//!
//! # Export subscriptions
//! estuary export --output feeds.opml
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together the feed-list store,
/// the cache, and the aggregator.
pub mod app;

/// Merges cached feed snapshots into one timeline: selection, search,
/// newest-first sort, pagination.
pub mod aggregator;

/// Per-feed TTL cache over a key-value store abstraction.
///
/// - [`CacheStore`](cache::CacheStore): storage trait with atomic replace
/// - [`FileCacheStore`](cache::FileCacheStore): one JSON file per feed id
/// - [`MemoryCacheStore`](cache::MemoryCacheStore): in-memory, for tests
/// - [`FeedCache`](cache::FeedCache): the fresh/fetched/stale state machine
pub mod cache;

/// Command-line interface using clap.
///
/// Subcommands mirror the service actions: `feeds`, `articles`, `add`,
/// `remove`, `refresh`, `settings`, `export`.
pub mod cli;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a subscription
/// - [`Item`](domain::Item) / [`Article`](domain::Article): normalized entries
/// - [`ParsedFeed`](domain::ParsedFeed) / [`FeedSnapshot`](domain::FeedSnapshot):
///   parse results with cache provenance
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for feed retrieval
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Converts raw RSS items and Atom entries into unified items: image
/// extraction, tag stripping, description clipping, permissive dates.
pub mod normalizer;

/// OPML 2.0 export of the feed list.
pub mod opml;

/// Feed document recognition and parsing.
pub mod parser;

/// Feed-list persistence (`feeds.json`) and settings.
pub mod store;
