use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::app::{EstuaryError, Result};
use crate::domain::ParsedFeed;
use crate::normalizer;

/// A feed document, tagged by the syntax it was recognized as.
///
/// Recognition looks at document structure only: a `channel` child of the
/// root means RSS 2.0, a root element named `feed` means Atom. Anything
/// else that is still well-formed XML is `Unrecognized` and normalizes to
/// an empty result rather than an error. That leniency mirrors how the
/// aggregator has always treated odd-but-parseable documents; tests pin
/// it down as a documented quirk.
#[derive(Debug)]
pub enum FeedDocument {
    Rss(Box<rss::Channel>),
    Atom(Box<atom_syndication::Feed>),
    Unrecognized,
}

/// Parse a raw feed document into a [`ParsedFeed`].
///
/// Malformed XML is a hard error; every well-formed document succeeds.
pub fn parse(body: &[u8]) -> Result<ParsedFeed> {
    Ok(read_document(body)?.into_parsed())
}

/// Classify and parse a raw document into a [`FeedDocument`].
pub fn read_document(body: &[u8]) -> Result<FeedDocument> {
    match detect(body)? {
        DocumentKind::Rss => {
            let channel = rss::Channel::read_from(body)
                .map_err(|e| EstuaryError::Parse(e.to_string()))?;
            Ok(FeedDocument::Rss(Box::new(channel)))
        }
        DocumentKind::Atom => {
            let feed = atom_syndication::Feed::read_from(body)
                .map_err(|e| EstuaryError::Parse(e.to_string()))?;
            Ok(FeedDocument::Atom(Box::new(feed)))
        }
        DocumentKind::Unrecognized => {
            debug!("unrecognized feed document root, producing empty result");
            Ok(FeedDocument::Unrecognized)
        }
    }
}

impl FeedDocument {
    pub fn into_parsed(self) -> ParsedFeed {
        match self {
            FeedDocument::Rss(channel) => {
                let items: Vec<_> = channel.items().iter().map(normalizer::rss_item).collect();
                ParsedFeed {
                    title: channel.title().to_string(),
                    link: channel.link().to_string(),
                    description: channel.description().to_string(),
                    item_count: items.len(),
                    items,
                }
            }
            FeedDocument::Atom(feed) => {
                let items: Vec<_> = feed.entries().iter().map(normalizer::atom_entry).collect();
                ParsedFeed {
                    title: feed.title().value.clone(),
                    link: normalizer::alternate_link(feed.links()),
                    description: feed
                        .subtitle()
                        .map(|t| t.value.clone())
                        .unwrap_or_default(),
                    item_count: items.len(),
                    items,
                }
            }
            FeedDocument::Unrecognized => ParsedFeed::default(),
        }
    }
}

enum DocumentKind {
    Rss,
    Atom,
    Unrecognized,
}

/// Single pass over the document: verifies well-formedness and inspects
/// the root element and its direct children.
fn detect(body: &[u8]) -> Result<DocumentKind> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();

    let mut root: Option<Vec<u8>> = None;
    let mut has_channel = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if depth == 0 && root.is_none() {
                    root = Some(e.local_name().as_ref().to_vec());
                } else if depth == 1 && e.local_name().as_ref() == b"channel" {
                    has_channel = true;
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 && root.is_none() {
                    root = Some(e.local_name().as_ref().to_vec());
                } else if depth == 1 && e.local_name().as_ref() == b"channel" {
                    has_channel = true;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(EstuaryError::Parse(e.to_string())),
        }
        buf.clear();
    }

    let root = root.ok_or_else(|| EstuaryError::Parse("document has no root element".into()))?;

    if has_channel {
        Ok(DocumentKind::Rss)
    } else if root == b"feed" {
        Ok(DocumentKind::Atom)
    } else {
        Ok(DocumentKind::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <description>This is item 2</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <subtitle>An Atom test feed</subtitle>
  <id>urn:feed</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <link rel="self" href="https://example.com/feed.atom"/>
  <link rel="alternate" href="https://example.com/"/>
  <entry>
    <title>Atom Entry 1</title>
    <id>urn:entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <link href="https://example.com/atom1"/>
    <summary>This is Atom entry 1</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let parsed = parse(RSS_SAMPLE.as_bytes()).unwrap();

        assert_eq!(parsed.title, "Test Feed");
        assert_eq!(parsed.link, "https://example.com");
        assert_eq!(parsed.description, "A test feed");
        assert_eq!(parsed.item_count, 2);
        assert_eq!(parsed.items[0].title, "Test Item 1");
        assert_eq!(parsed.items[0].link, "https://example.com/item1");
        assert_eq!(parsed.items[0].timestamp, 1704067200);
    }

    #[test]
    fn test_parse_atom() {
        let parsed = parse(ATOM_SAMPLE.as_bytes()).unwrap();

        assert_eq!(parsed.title, "Atom Test Feed");
        assert_eq!(parsed.description, "An Atom test feed");
        assert_eq!(parsed.link, "https://example.com/");
        assert_eq!(parsed.item_count, 1);
        assert_eq!(parsed.items[0].title, "Atom Entry 1");
        assert_eq!(parsed.items[0].link, "https://example.com/atom1");
    }

    #[test]
    fn test_unrecognized_root_is_empty_not_error() {
        let doc = "<html><body><p>not a feed</p></body></html>";
        let parsed = parse(doc.as_bytes()).unwrap();

        assert_eq!(parsed.item_count, 0);
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.title, "");
        assert_eq!(parsed.link, "");
        assert_eq!(parsed.description, "");
    }

    #[test]
    fn test_malformed_xml_is_hard_error() {
        let doc = "<rss><channel><title>broken</channel></rss>";
        assert!(parse(doc.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(parse(b"").is_err());
        assert!(parse(b"   \n").is_err());
    }

}
