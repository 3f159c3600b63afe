use serde::{Deserialize, Serialize};

/// A single normalized feed entry.
///
/// `pub_date` keeps the source's original date string; `timestamp` is the
/// parsed epoch-seconds value used for sorting. Fields that the source
/// does not provide are empty rather than absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
    pub timestamp: i64,
    pub image: String,
    pub author: String,
    pub categories: Vec<String>,
}

/// An item in the aggregate timeline, stamped with its owning feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(flatten)]
    pub item: Item,
    pub feed_id: String,
    pub feed_title: String,
    pub feed_icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_serializes_flat() {
        let article = Article {
            item: Item {
                title: "Hello".into(),
                link: "https://example.com/1".into(),
                pub_date: "Mon, 01 Jan 2024 00:00:00 GMT".into(),
                timestamp: 1704067200,
                ..Default::default()
            },
            feed_id: "feed_0011223344556677".into(),
            feed_title: "Example".into(),
            feed_icon: "📰".into(),
        };

        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["title"], "Hello");
        assert_eq!(value["pubDate"], "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(value["feedId"], "feed_0011223344556677");
        assert_eq!(value["feedTitle"], "Example");
        assert_eq!(value["feedIcon"], "📰");
    }
}
