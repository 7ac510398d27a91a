//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait and the common [`Feed`] and
//! [`Entry`] types. Concrete source implementations live in sub-modules
//! (currently only [`rss`]).
//!
//! ## Adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct and implement [`DataSource`] for it.
//! 3. Add the module below and re-export the struct.
//! 4. Construct instances in `main.rs` from the feed list.
//!
//! The cursor, formatter and poller are all source-agnostic.

mod entry;
mod rss;

pub use entry::{Entry, Feed};
pub use rss::RssSource;

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::error::BotError;

/// Trait that every data source must implement.
///
/// The poller calls [`fetch()`](DataSource::fetch) once per run for each
/// source, sequentially.
pub trait DataSource: Send {
    /// The feed URL. It names the source in logs and keys its seen-set.
    fn url(&self) -> &str;

    /// Fetch and parse the feed. Errors are logged by the poller and the
    /// feed is skipped for this run.
    fn fetch(&self) -> Result<Feed>;
}

/// Read the feed list: one URL per line, surrounding whitespace trimmed and
/// blank lines skipped. An unreadable file is fatal for the run.
pub fn load_feed_list(path: &Path) -> Result<Vec<String>, BotError> {
    let text = fs::read_to_string(path).map_err(|source| BotError::FeedFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
