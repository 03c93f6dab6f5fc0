use regex::Regex;
use std::sync::OnceLock;

/// Shape of a minutes PDF upload link: scheme, the town site host, the
/// wp-content upload path with numeric year and month segments, and a
/// basename ending in `.pdf`. An optional query string or fragment is part
/// of the match (and therefore of the URL) but never of the filename.
const UPLOAD_URL_PATTERN: &str = r#"https?://town\.plattekill\.ny\.us/wp-content/uploads/(\d+)/(\d+)/([^/?#"'\s<>]+)\.pdf(?:[?#][^"'\s<>]*)?"#;

static UPLOAD_URL: OnceLock<Regex> = OnceLock::new();

fn upload_url() -> &'static Regex {
    UPLOAD_URL.get_or_init(|| {
        Regex::new(UPLOAD_URL_PATTERN).expect("hardcoded upload pattern compiles")
    })
}

/// A downloadable resource referenced from an item's embedded content.
///
/// Produced exclusively by [`extract_attachment`]; the URL is always
/// non-empty and the filename is always the path basename plus `.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The full URL as it appeared in the content, query string included.
    pub url: String,
    /// Canonical filename rebuilt from the URL's path basename.
    pub filename: String,
}

/// Extracts the first PDF upload reference embedded in `raw`.
///
/// The content of a minutes item is an HTML blob carrying one download link
/// to the uploaded PDF. Only the leftmost match is used; further matches in
/// the same blob are ignored. Returns `None` when no link of the expected
/// shape is present, which callers treat as "this item has no attachment"
/// rather than as an error.
pub fn extract_attachment(raw: &str) -> Option<Attachment> {
    let caps = match upload_url().captures(raw) {
        Some(caps) => caps,
        None => {
            tracing::warn!(len = raw.len(), "No attachment URL found in embedded content");
            return None;
        }
    };

    let url = caps.get(0)?.as_str().to_string();
    let Some(basename) = caps.get(3) else {
        tracing::warn!(url = %url, "Matched upload URL is missing its basename");
        return None;
    };

    Some(Attachment {
        url,
        filename: format!("{}.pdf", basename.as_str()),
    })
}
