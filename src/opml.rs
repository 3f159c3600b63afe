use html_escape::encode_double_quoted_attribute;

use crate::domain::{group_by_category, Feed};

/// Render the feed list as an OPML 2.0 document.
///
/// Feeds are grouped by category in first-seen order, one `<outline>`
/// block per category with one `type="rss"` leaf per feed.
pub fn render(feeds: &[Feed]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<opml version=\"2.0\">\n");
    out.push_str("  <head><title>estuary export</title></head>\n");
    out.push_str("  <body>\n");

    for (category, members) in group_by_category(feeds) {
        out.push_str(&format!(
            "    <outline text=\"{}\">\n",
            encode_double_quoted_attribute(&category)
        ));
        for feed in members {
            out.push_str(&format!(
                "      <outline type=\"rss\" text=\"{}\" xmlUrl=\"{}\"/>\n",
                encode_double_quoted_attribute(&feed.title),
                encode_double_quoted_attribute(&feed.url)
            ));
        }
        out.push_str("    </outline>\n");
    }

    out.push_str("  </body>\n");
    out.push_str("</opml>\n");
    out
}
