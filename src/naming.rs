//! Destination filename derivation.
//!
//! Each downloaded attachment is named after its entry's publication date,
//! prefixed with the first category that distinguishes the entry from the
//! regular minutes. The derivation is deterministic, so re-runs map every
//! entry to the same path and the existence check in the download loop makes
//! the whole tool idempotent.

use chrono::{DateTime, FixedOffset};

use crate::feed::Entry;

/// Category carried by every item in the minutes feed. Only a category
/// differing from this one says anything about an entry, so it is the one
/// value never used as a filename label.
const DEFAULT_CATEGORY: &str = "Minutes";

/// Renders a publication date as a compact sortable tag: zero-padded year,
/// month, day, hour, minute and second, no separators. The offset already on
/// the value is used as-is; no timezone conversion.
pub fn timestamp_tag(t: &DateTime<FixedOffset>) -> String {
    t.format("%Y%m%d%H%M%S").to_string()
}

/// Derives the destination filename for `entry`.
///
/// The first category that differs from `"Minutes"` becomes a label and the
/// name is `<label>_<tag>.pdf`; scanning stops at the first hit. Without
/// such a category the bare tag is the name, with no `.pdf` extension. That
/// asymmetry is intentional and locked in by tests.
///
/// Returns `None` when the entry has no publication date; there is nothing
/// deterministic to name such an entry after, so the caller skips it.
pub fn derive_filename(entry: &Entry) -> Option<String> {
    let published = entry.published.as_ref()?;
    let tag = timestamp_tag(published);

    match entry
        .categories
        .iter()
        .find(|c| c.as_str() != DEFAULT_CATEGORY)
    {
        Some(label) => Some(format!("{label}_{tag}.pdf")),
        None => Some(tag),
    }
}
