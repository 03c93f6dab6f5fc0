//! Sequential download of entry attachments.
//!
//! Entries are processed strictly one at a time, in document order. Each
//! entry independently resolves to one [`Outcome`]; a failure on one entry
//! never stops the ones after it. Response bodies and file handles live only
//! for the entry being processed.

use futures::StreamExt;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::feed::{Entry, Feed};
use crate::naming::derive_filename;

/// Errors that can fail a single entry's download.
///
/// These are per-entry and recoverable: the loop reports them and moves on.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error fetching the attachment
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Destination file could not be created
    #[error("Failed to create {path}: {source}")]
    Create {
        path: String,
        source: std::io::Error,
    },
    /// Writing the response body to disk failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// What happened to one feed entry.
#[derive(Debug)]
pub enum Outcome {
    /// Attachment fetched and written to disk.
    Downloaded { filename: String, bytes: u64 },
    /// Destination file already present; nothing fetched, nothing touched.
    AlreadyExists { filename: String },
    /// Entry has no publication date to derive a filename from.
    SkippedNoTimestamp,
    /// Entry content contained no resolvable attachment reference.
    SkippedNoAttachment,
    /// Fetch or write failed; later entries are unaffected.
    Failed {
        filename: String,
        error: DownloadError,
    },
}

/// Tally of per-entry outcomes across one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: usize,
    pub already_present: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Processes every entry of `feed`, downloading attachments into the
/// configured output directory.
///
/// Existing destination files are never overwritten; the check is on
/// existence only, not content. Returns the outcome tally for the run.
pub async fn run(client: &reqwest::Client, feed: &Feed, config: &Config) -> Summary {
    let mut summary = Summary::default();

    for entry in &feed.entries {
        match process_entry(client, entry, config).await {
            Outcome::Downloaded { filename, bytes } => {
                tracing::info!(file = %filename, bytes, "Downloaded attachment");
                summary.downloaded += 1;
            }
            Outcome::AlreadyExists { filename } => {
                tracing::warn!(file = %filename, "File already exists, skipping");
                summary.already_present += 1;
            }
            Outcome::SkippedNoTimestamp => {
                tracing::warn!(title = %entry.title, "Entry has no publication date, skipping");
                summary.skipped += 1;
            }
            Outcome::SkippedNoAttachment => {
                tracing::warn!(title = %entry.title, "Entry has no attachment, skipping");
                summary.skipped += 1;
            }
            Outcome::Failed { filename, error } => {
                tracing::error!(file = %filename, error = %error, "Download failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Resolves one entry to its outcome: skip, already-present, downloaded or
/// failed.
pub async fn process_entry(client: &reqwest::Client, entry: &Entry, config: &Config) -> Outcome {
    let Some(filename) = derive_filename(entry) else {
        return Outcome::SkippedNoTimestamp;
    };
    let Some(attachment) = entry.attachment.as_ref() else {
        return Outcome::SkippedNoAttachment;
    };

    let dest = config.output_dir.join(&filename);
    if dest.exists() {
        return Outcome::AlreadyExists { filename };
    }

    match download_to(client, &attachment.url, &dest).await {
        Ok(bytes) => Outcome::Downloaded { filename, bytes },
        Err(error) => Outcome::Failed { filename, error },
    }
}

/// Streams the body of `url` into a freshly created file at `dest`.
///
/// The file is created with `create_new`, so a concurrent appearance of the
/// destination surfaces as a create error instead of an overwrite. A partial
/// file may remain behind when a write or the transfer fails; there is no
/// rollback.
async fn download_to(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus(response.status().as_u16()));
    }

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .await
        .map_err(|source| DownloadError::Create {
            path: dest.display().to_string(),
            source,
        })?;

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(DownloadError::Network)?;
        file.write_all(&chunk)
            .await
            .map_err(|source| DownloadError::Write {
                path: dest.display().to_string(),
                source,
            })?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|source| DownloadError::Write {
        path: dest.display().to_string(),
        source,
    })?;

    Ok(written)
}
