use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::aggregator::FeedSelection;
use crate::app::{AppContext, EstuaryError, Result};
use crate::domain::{generate_feed_id, validate_feed_url, Feed};
use crate::opml;
use crate::parser;

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let list = ctx.store.load()?;

    print_json(&json!({
        "success": true,
        "feeds": list.feeds,
        "settings": list.settings,
    }))
}

pub async fn articles(
    ctx: &AppContext,
    feeds_csv: Option<&str>,
    page: usize,
    per_page: Option<usize>,
    search: Option<&str>,
) -> Result<()> {
    let list = ctx.store.load()?;
    let selection = FeedSelection::from_csv(feeds_csv);
    let per_page = per_page.unwrap_or(list.settings.items_per_page);

    let (items, pagination) = ctx
        .aggregator
        .aggregate(
            &list.feeds,
            &selection,
            page,
            per_page,
            search.map(str::trim).unwrap_or(""),
            list.settings.cache_minutes,
        )
        .await;

    print_json(&json!({
        "success": true,
        "items": items,
        "pagination": pagination,
    }))
}

pub async fn add_feed(
    ctx: &AppContext,
    url: &str,
    title: Option<&str>,
    category: &str,
    icon: &str,
) -> Result<()> {
    validate_feed_url(url)?;

    // Verify the URL serves a parseable feed before saving anything.
    let body = ctx.fetcher.fetch(url).await?;
    let parsed = parser::parse(&body)?;

    let mut list = ctx.store.load()?;
    if list.contains_url(url) {
        return Err(EstuaryError::DuplicateFeed(url.to_string()));
    }

    let title = match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ if parsed.title.is_empty() => "Untitled Feed".to_string(),
        _ => parsed.title.clone(),
    };

    let feed = Feed {
        id: generate_feed_id(),
        url: url.to_string(),
        title,
        category: category.to_string(),
        icon: icon.to_string(),
    };
    info!(feed_id = %feed.id, url, "adding feed");

    list.feeds.push(feed.clone());
    ctx.store.save(&list)?;

    print_json(&json!({
        "success": true,
        "feed": feed,
        "message": "Feed added successfully",
    }))
}

pub fn remove_feed(ctx: &AppContext, id: &str) -> Result<()> {
    let mut list = ctx.store.load()?;
    if !list.remove(id) {
        return Err(EstuaryError::FeedNotFound(id.to_string()));
    }

    ctx.store.save(&list)?;
    ctx.cache.remove(id)?;
    info!(feed_id = id, "removed feed");

    print_json(&json!({
        "success": true,
        "message": "Feed removed successfully",
    }))
}

pub async fn refresh_feed(ctx: &AppContext, id: &str) -> Result<()> {
    let list = ctx.store.load()?;
    let feed = list
        .find(id)
        .ok_or_else(|| EstuaryError::FeedNotFound(id.to_string()))?;

    // TTL 0 forces the refetch while keeping the stale fallback.
    let outcome = ctx.cache.get(&feed.id, &feed.url, 0).await;

    print_json(&json!({
        "success": true,
        "feed": outcome.into_snapshot(),
    }))
}

pub fn settings(
    ctx: &AppContext,
    cache_minutes: Option<u64>,
    items_per_page: Option<usize>,
) -> Result<()> {
    let mut list = ctx.store.load()?;

    if cache_minutes.is_some() || items_per_page.is_some() {
        if let Some(minutes) = cache_minutes {
            list.settings.cache_minutes = minutes;
        }
        if let Some(per_page) = items_per_page {
            list.settings.items_per_page = per_page.max(1);
        }
        ctx.store.save(&list)?;
    }

    print_json(&json!({
        "success": true,
        "settings": list.settings,
    }))
}

pub fn export(ctx: &AppContext, output: Option<&Path>) -> Result<()> {
    let list = ctx.store.load()?;
    let document = opml::render(&list.feeds);

    match output {
        Some(path) => {
            std::fs::write(path, &document)?;
            print_json(&json!({
                "success": true,
                "message": format!("Exported {} feeds to {}", list.feeds.len(), path.display()),
            }))?;
        }
        None => print!("{}", document),
    }

    Ok(())
}
