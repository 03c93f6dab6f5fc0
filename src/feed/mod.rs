//! Feed retrieval and decoding.
//!
//! This module turns the remote WordPress category feed into a typed,
//! read-only model:
//!
//! - [`fetcher`] - one-shot HTTP retrieval of the feed document
//! - [`parser`] - RSS channel/item decoding into [`Entry`] values
//! - [`attachment`] - recovery of the PDF upload reference embedded in an
//!   item's HTML content
//!
//! The model is built once per run and consumed read-only by the download
//! loop; nothing here mutates after decoding.

mod attachment;
mod fetcher;
mod parser;

pub use attachment::{extract_attachment, Attachment};
pub use fetcher::{fetch_feed, FetchError};
pub use parser::{parse_feed, ParseError};

use chrono::{DateTime, FixedOffset};

/// A decoded feed document: the channel's items in document order.
#[derive(Debug, Clone)]
pub struct Feed {
    pub entries: Vec<Entry>,
}

/// One item of the minutes feed.
#[derive(Debug, Clone)]
pub struct Entry {
    pub title: String,
    pub link: String,
    /// Raw item description; kept opaque, never parsed further.
    pub description: String,
    /// PDF reference recovered from the item's embedded content, if any.
    pub attachment: Option<Attachment>,
    /// Categories in document order, duplicates included.
    pub categories: Vec<String>,
    /// Publication date with the offset it was published under. `None` when
    /// the item carried no `pubDate` or an unparseable one.
    pub published: Option<DateTime<FixedOffset>>,
}
