//! Downloads meeting-minutes PDFs referenced from a WordPress category feed.
//!
//! The pipeline is: fetch the feed document, decode it into typed entries
//! (recovering each entry's PDF attachment reference from its embedded HTML
//! content), derive a deterministic destination filename from the entry's
//! publication date and categories, then download each attachment that is
//! not already on disk. Feed-level failures abort the run; everything at the
//! entry level is reported and skipped past.

pub mod config;
pub mod download;
pub mod feed;
pub mod naming;
