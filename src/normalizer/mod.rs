use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Item;

/// Descriptions longer than this many characters are clipped.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).expect("valid img regex"));

/// Normalize one RSS 2.0 `<item>`.
pub fn rss_item(item: &rss::Item) -> Item {
    // Image priority: enclosure with an image type, then media:content /
    // media:thumbnail, then the first <img> in the fullest content field.
    let mut image = item
        .enclosure()
        .filter(|e| e.mime_type().contains("image"))
        .map(|e| e.url().to_string())
        .unwrap_or_default();

    if image.is_empty() {
        image = rss_media_image(item);
    }

    if image.is_empty() {
        let content = item.content().or(item.description()).unwrap_or_default();
        image = first_img_src(content).unwrap_or_default();
    }

    let description = clip_description(&strip_tags(item.description().unwrap_or_default()));

    let pub_date = item.pub_date().unwrap_or_default().to_string();
    let timestamp = parse_timestamp(&pub_date);

    let author = match item.author() {
        Some(author) => author.to_string(),
        None => item
            .dublin_core_ext()
            .and_then(|dc| dc.creators().first().cloned())
            .unwrap_or_default(),
    };

    let categories = item
        .categories()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    Item {
        title: item.title().unwrap_or_default().to_string(),
        link: item.link().unwrap_or_default().to_string(),
        description,
        pub_date,
        timestamp,
        image,
        author,
        categories,
    }
}

/// Normalize one Atom `<entry>`.
///
/// Categories stay empty for Atom entries.
pub fn atom_entry(entry: &atom_syndication::Entry) -> Item {
    let link = alternate_link(entry.links());

    let summary = entry.summary().map(|t| t.value.clone());
    let content = entry
        .content()
        .and_then(|c| c.value())
        .map(|v| v.to_string());

    let raw_description = summary.clone().or_else(|| content.clone()).unwrap_or_default();
    let description = clip_description(&strip_tags(&raw_description));

    let mut image = atom_enclosure_image(entry);

    if image.is_empty() {
        image = atom_media_image(entry);
    }

    if image.is_empty() {
        // The full content is the better <img> source; summaries are
        // usually stripped down.
        let scan = content.as_deref().or(summary.as_deref()).unwrap_or_default();
        image = first_img_src(scan).unwrap_or_default();
    }

    let published = entry.published().copied().unwrap_or_else(|| *entry.updated());
    let pub_date = published.to_rfc3339();
    let timestamp = published.timestamp();

    let author = entry
        .authors()
        .first()
        .map(|p| p.name().to_string())
        .unwrap_or_default();

    Item {
        title: entry.title().value.clone(),
        link,
        description,
        pub_date,
        timestamp,
        image,
        author,
        categories: Vec::new(),
    }
}

/// Pick an Atom link: first with rel "alternate" (or no rel), else the
/// first link of any kind.
pub fn alternate_link(links: &[atom_syndication::Link]) -> String {
    links
        .iter()
        .find(|l| l.rel() == "alternate" || l.rel().is_empty())
        .or_else(|| links.first())
        .map(|l| l.href().to_string())
        .unwrap_or_default()
}

fn rss_media_image(item: &rss::Item) -> String {
    if let Some(media) = item.extensions().get("media") {
        if let Some(contents) = media.get("content") {
            if let Some(url) = contents.first().and_then(|c| c.attrs().get("url")) {
                return url.clone();
            }
        } else if let Some(thumbnails) = media.get("thumbnail") {
            if let Some(url) = thumbnails.first().and_then(|t| t.attrs().get("url")) {
                return url.clone();
            }
        }
    }

    String::new()
}

fn atom_media_image(entry: &atom_syndication::Entry) -> String {
    if let Some(media) = entry.extensions().get("media") {
        if let Some(contents) = media.get("content") {
            if let Some(url) = contents.first().and_then(|c| c.attrs().get("url")) {
                return url.clone();
            }
        } else if let Some(thumbnails) = media.get("thumbnail") {
            if let Some(url) = thumbnails.first().and_then(|t| t.attrs().get("url")) {
                return url.clone();
            }
        }
    }

    String::new()
}

fn atom_enclosure_image(entry: &atom_syndication::Entry) -> String {
    entry
        .links()
        .iter()
        .find(|l| {
            l.rel() == "enclosure"
                && l.mime_type().map(|m| m.contains("image")).unwrap_or(false)
        })
        .map(|l| l.href().to_string())
        .unwrap_or_default()
}

/// Find the first `<img ... src="...">` URL in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove markup tags and decode HTML entities.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    html_escape::decode_html_entities(&text).to_string()
}

/// Clip a plain-text description to [`DESCRIPTION_MAX_CHARS`] characters,
/// appending an ellipsis. Counts characters, so multi-byte characters are
/// never split.
pub fn clip_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_MAX_CHARS {
        return text.to_string();
    }

    let mut clipped: String = text.chars().take(DESCRIPTION_MAX_CHARS).collect();
    clipped.push_str(ELLIPSIS);
    clipped
}

/// Parse a source date string to epoch seconds.
///
/// Unparseable dates fall back to the current time, so an item with a
/// broken date sorts as just published. That matches how lenient feed
/// readers behave and is covered by tests.
pub fn parse_timestamp(raw: &str) -> i64 {
    parse_datetime(raw)
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| Utc::now().timestamp())
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        })
}
