use chrono::{DateTime, FixedOffset};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::feed::attachment::extract_attachment;
use crate::feed::{Entry, Feed};

/// Errors that can occur while decoding a feed document.
///
/// All of these are document-level and abort the run; anomalies inside a
/// single item (an unparseable date, a missing attachment link) degrade to
/// absent fields on that item instead.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The byte stream is not well-formed XML.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// The root element is not `<rss>`.
    #[error("Not an RSS document (root element <{0}>)")]
    UnexpectedRoot(String),

    /// The document ended while elements were still open.
    #[error("Unexpected end of document")]
    Truncated,

    /// The document ended without a `<channel>` element.
    #[error("RSS document contains no channel")]
    MissingChannel,
}

/// The item child elements we care about, by local name. Everything else
/// inside an item is traversed but ignored.
#[derive(Clone, Copy, PartialEq)]
enum ItemField {
    Title,
    Link,
    Description,
    Content,
    Category,
    PubDate,
}

impl ItemField {
    fn from_name(local: &[u8]) -> Option<Self> {
        match local {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"encoded" => Some(Self::Content),
            b"category" => Some(Self::Category),
            b"pubDate" => Some(Self::PubDate),
            _ => None,
        }
    }
}

/// Scalar fields accumulated while walking one `<item>`.
#[derive(Default)]
struct ItemFields {
    title: String,
    link: String,
    description: String,
    content: Option<String>,
    categories: Vec<String>,
    pub_date: Option<String>,
}

impl ItemFields {
    fn into_entry(self) -> Entry {
        let published = self.pub_date.as_deref().and_then(parse_pub_date);
        let attachment = self.content.as_deref().and_then(extract_attachment);
        Entry {
            title: self.title,
            link: self.link,
            description: self.description,
            attachment,
            categories: self.categories,
            published,
        }
    }
}

/// Decodes an RSS document into a [`Feed`].
///
/// Items are returned in document order. Per-item anomalies never fail the
/// decode: an item with an unparseable `pubDate` or without a recognizable
/// attachment link still appears in the result, with the corresponding field
/// absent. The only fatal conditions are malformed XML and a document that
/// is not an RSS channel at all.
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut saw_root = false;
    let mut saw_channel = false;
    let mut depth: usize = 0;
    let mut in_item = false;
    let mut item = ItemFields::default();
    let mut field: Option<ItemField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let local = e.local_name();
                if !saw_root {
                    if local.as_ref() != b"rss" {
                        let name = String::from_utf8_lossy(local.as_ref()).into_owned();
                        return Err(ParseError::UnexpectedRoot(name));
                    }
                    saw_root = true;
                } else if local.as_ref() == b"channel" {
                    saw_channel = true;
                } else if local.as_ref() == b"item" {
                    in_item = true;
                    item = ItemFields::default();
                } else if in_item {
                    field = ItemField::from_name(local.as_ref());
                    text.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_item && field.is_some() {
                    let decoded = e
                        .unescape()
                        .map_err(|e| ParseError::XmlParse(e.to_string()))?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item && field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                let local = e.local_name();
                if local.as_ref() == b"item" {
                    in_item = false;
                    field = None;
                    entries.push(std::mem::take(&mut item).into_entry());
                } else if in_item {
                    match field.take() {
                        Some(ItemField::Title) => item.title = std::mem::take(&mut text),
                        Some(ItemField::Link) => item.link = std::mem::take(&mut text),
                        Some(ItemField::Description) => {
                            item.description = std::mem::take(&mut text)
                        }
                        Some(ItemField::Content) => item.content = Some(std::mem::take(&mut text)),
                        Some(ItemField::Category) => {
                            item.categories.push(std::mem::take(&mut text))
                        }
                        Some(ItemField::PubDate) => item.pub_date = Some(std::mem::take(&mut text)),
                        None => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    // quick-xml does not flag unclosed elements at end of input on its own.
    if depth != 0 {
        return Err(ParseError::Truncated);
    }
    if !saw_channel {
        return Err(ParseError::MissingChannel);
    }

    Ok(Feed { entries })
}

/// Parses an RFC 2822 publication date, the format RSS mandates for
/// `pubDate`. The offset carried on the source text is preserved as-is; no
/// timezone conversion happens here or anywhere downstream.
fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(date = raw, error = %e, "Could not parse pubDate, leaving it absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use pretty_assertions::assert_eq;

    fn feed_with_items(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Minutes</title>
    <link>http://town.plattekill.ny.us</link>
    <description>Town minutes</description>
    {items}
  </channel>
</rss>"#
        )
    }

    const FULL_ITEM: &str = r#"<item>
      <title>January Minutes</title>
      <link>http://town.plattekill.ny.us/2006/01/january-minutes/</link>
      <description>Minutes from the January meeting.</description>
      <category>Minutes</category>
      <category>BoardMeeting</category>
      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
      <content:encoded><![CDATA[<p><a href="https://town.plattekill.ny.us/wp-content/uploads/2006/01/jan-minutes.pdf">January minutes</a></p>]]></content:encoded>
    </item>"#;

    #[test]
    fn test_decode_full_item() {
        let doc = feed_with_items(FULL_ITEM);
        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.title, "January Minutes");
        assert_eq!(
            entry.link,
            "http://town.plattekill.ny.us/2006/01/january-minutes/"
        );
        assert_eq!(entry.description, "Minutes from the January meeting.");
        assert_eq!(entry.categories, vec!["Minutes", "BoardMeeting"]);

        let attachment = entry.attachment.as_ref().unwrap();
        assert_eq!(
            attachment.url,
            "https://town.plattekill.ny.us/wp-content/uploads/2006/01/jan-minutes.pdf"
        );
        assert_eq!(attachment.filename, "jan-minutes.pdf");

        // The -0700 offset stays on the parsed value: hour is 15, not 22.
        let published = entry.published.unwrap();
        assert_eq!(published.hour(), 15);
        assert_eq!(published.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_unparseable_pub_date_leaves_entry_intact() {
        let doc = feed_with_items(
            r#"<item>
          <title>Undated</title>
          <link>http://town.plattekill.ny.us/undated/</link>
          <description>No usable date.</description>
          <pubDate>sometime last week</pubDate>
        </item>"#,
        );
        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].title, "Undated");
        assert_eq!(feed.entries[0].published, None);
    }

    #[test]
    fn test_missing_content_means_no_attachment() {
        let doc = feed_with_items(
            r#"<item>
          <title>Bare announcement</title>
          <pubDate>Tue, 07 Mar 2017 09:30:00 -0500</pubDate>
        </item>"#,
        );
        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert_eq!(feed.entries[0].attachment, None);
        assert!(feed.entries[0].published.is_some());
    }

    #[test]
    fn test_content_without_upload_link_means_no_attachment() {
        let doc = feed_with_items(
            r#"<item>
          <title>Announcement</title>
          <content:encoded><![CDATA[<p>The meeting is cancelled.</p>]]></content:encoded>
        </item>"#,
        );
        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert_eq!(feed.entries[0].attachment, None);
    }

    #[test]
    fn test_duplicate_categories_preserved_in_order() {
        let doc = feed_with_items(
            r#"<item>
          <title>Doubled</title>
          <category>Minutes</category>
          <category>Minutes</category>
          <category>Special</category>
        </item>"#,
        );
        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert_eq!(
            feed.entries[0].categories,
            vec!["Minutes", "Minutes", "Special"]
        );
    }

    #[test]
    fn test_items_keep_document_order() {
        let doc = feed_with_items(
            r#"<item><title>first</title></item>
               <item><title>second</title></item>
               <item><title>third</title></item>"#,
        );
        let feed = parse_feed(doc.as_bytes()).unwrap();
        let titles: Vec<_> = feed.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_channel_decodes_to_no_entries() {
        let doc = feed_with_items("");
        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let doc = br#"<?xml version="1.0"?><rss><channel><item><title>cut"#;
        let result = parse_feed(doc);
        assert!(result.is_err(), "truncated document must not decode");
    }

    #[test]
    fn test_invalid_markup_is_fatal() {
        let result = parse_feed(b"<not valid xml");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_rss_root_is_fatal() {
        let result = parse_feed(b"<?xml version=\"1.0\"?><html><body/></html>");
        assert!(matches!(result, Err(ParseError::UnexpectedRoot(name)) if name == "html"));
    }

    #[test]
    fn test_document_without_channel_is_fatal() {
        let result = parse_feed(b"<?xml version=\"1.0\"?><rss version=\"2.0\"></rss>");
        assert!(matches!(result, Err(ParseError::MissingChannel)));
    }
}
