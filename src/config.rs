//! Runtime configuration assembled once at startup.
//!
//! The tool has exactly two options, both plain strings on the command line:
//! the feed URL and the output directory. They are validated here and carried
//! in an explicit [`Config`] that is passed into the download loop; there is
//! no ambient or global configuration state.

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Feed consulted when no `--feed-url` is given.
pub const DEFAULT_FEED_URL: &str = "http://town.plattekill.ny.us/category/minutes/feed/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid feed URL: {0}")]
    InvalidFeedUrl(#[from] url::ParseError),

    #[error("Unsupported feed URL scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validated runtime options for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the WordPress category feed to read.
    pub feed_url: Url,
    /// Directory downloaded attachments are written into.
    pub output_dir: PathBuf,
}

impl Config {
    /// Builds a config from the raw command-line values.
    ///
    /// The feed URL must parse and use an http or https scheme; anything
    /// else is rejected before a single request is made. The output
    /// directory is taken as given; a missing or unwritable directory
    /// surfaces per entry when the first file is created there.
    pub fn new(feed_url: &str, output_dir: PathBuf) -> Result<Self, ConfigError> {
        let feed_url = Url::parse(feed_url)?;
        match feed_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(ConfigError::UnsupportedScheme(scheme.to_owned())),
        }

        Ok(Self {
            feed_url,
            output_dir,
        })
    }
}
