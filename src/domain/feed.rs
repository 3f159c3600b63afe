use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{EstuaryError, Result};

/// A subscribed feed as stored in the feed list.
///
/// The `id` is an opaque stable string; `url` is unique across the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub icon: String,
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

/// Generate an opaque feed id: `feed_` followed by 8 random bytes in hex.
pub fn generate_feed_id() -> String {
    let bytes: [u8; 8] = rand::random();
    format!("feed_{}", hex::encode(bytes))
}

/// Check that a feed URL is well-formed and uses http or https.
///
/// Applied before any fetch is attempted.
pub fn validate_feed_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|_| EstuaryError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(EstuaryError::InvalidUrl(url.to_string())),
    }
}

/// Group feeds by category, preserving first-seen category order and
/// feed order within each category.
pub fn group_by_category(feeds: &[Feed]) -> Vec<(String, Vec<&Feed>)> {
    let mut groups: Vec<(String, Vec<&Feed>)> = Vec::new();

    for feed in feeds {
        match groups.iter_mut().find(|(name, _)| *name == feed.category) {
            Some((_, members)) => members.push(feed),
            None => groups.push((feed.category.clone(), vec![feed])),
        }
    }

    groups
}
