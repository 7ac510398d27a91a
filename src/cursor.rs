//! Feed cursor: decides which entries of a feed are new.
//!
//! Every entry is reduced to a [`Fingerprint`] (a hash of its identifier and
//! raw timestamp). The fingerprints already handled for a feed form its
//! [`SeenSet`], stored by [`SeenStore`] as an append-only file with one hex
//! digest per line.
//!
//! A pass over one feed has two phases:
//!
//! 1. [`select_new`] walks the entries newest-first and picks the ones to
//!    emit, stopping at the first already-seen entry.
//! 2. After the caller has emitted them, [`SeenStore::append`] records the
//!    selected fingerprints.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::source::Entry;

/// Entries older than this are dropped without being recorded.
pub const STALENESS_DAYS: i64 = 30;

/// Number of entries emitted on a feed's first pass.
pub const BOOTSTRAP_CAP: usize = 3;

// ---------------------------------------------------------------------------
// Fingerprints
// ---------------------------------------------------------------------------

/// De-duplication key of an entry: hex SHA-256 of `id` followed by the raw
/// timestamp string (empty when the entry has none).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(id: &str, timestamp: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        hasher.update(timestamp.unwrap_or_default().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn of(entry: &Entry) -> Self {
        Self::compute(&entry.id, entry.timestamp.as_deref())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Seen-set
// ---------------------------------------------------------------------------

/// Fingerprints already processed for one feed.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    hashes: HashSet<String>,
}

impl SeenSet {
    /// Parse the on-disk format: one fingerprint per line, surrounding
    /// whitespace ignored, blank lines skipped.
    pub fn parse(text: &str) -> Self {
        let hashes = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { hashes }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.hashes.contains(fingerprint.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }
}

impl FromIterator<Fingerprint> for SeenSet {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self {
            hashes: iter.into_iter().map(|fp| fp.0).collect(),
        }
    }
}

/// Seen-set files, one per feed, inside the data directory.
///
/// No locking: a single run at a time is assumed to touch a feed's file.
#[derive(Debug, Clone)]
pub struct SeenStore {
    dir: PathBuf,
}

impl SeenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the seen-set for the feed at `feed_url`, named after the
    /// URL's network location (`host[:port]`).
    ///
    /// Returns `None` for URLs without a host.
    pub fn path_for(&self, feed_url: &str) -> Option<PathBuf> {
        let url = url::Url::parse(feed_url).ok()?;
        let host = url.host_str().filter(|h| !h.is_empty())?;
        let key = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Some(self.dir.join(key))
    }

    /// Read a seen-set. A missing or unreadable file is an empty set, which
    /// puts the feed into its first-run bootstrap.
    pub fn load(&self, path: &Path) -> SeenSet {
        match fs::read_to_string(path) {
            Ok(text) => SeenSet::parse(&text),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no readable seen-set, starting empty");
                SeenSet::default()
            }
        }
    }

    /// Append fingerprints to a seen-set file, creating it if needed.
    pub fn append(&self, path: &Path, fingerprints: &[Fingerprint]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut buf = String::with_capacity(fingerprints.len() * 65);
        for fp in fingerprints {
            buf.push_str(fp.as_str());
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())?;
        file.flush()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Outcome of [`select_new`].
#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// Entries to emit, in received (newest-first) order.
    pub entries: Vec<&'a Entry>,
    /// Fingerprints of `entries`, index-aligned, to append once emitted.
    pub fingerprints: Vec<Fingerprint>,
}

impl Selection<'_> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True when the entry carries a parsed timestamp older than the staleness
/// threshold relative to `now`. Undated entries are never stale.
pub fn is_stale(entry: &Entry, now: DateTime<Utc>) -> bool {
    entry
        .published
        .is_some_and(|published| now - published > Duration::days(STALENESS_DAYS))
}

/// Pick the entries of a feed that have not been emitted yet.
///
/// `entries` are expected newest-first. Walking them in order:
///
/// * stale entries are skipped and not recorded;
/// * the first already-seen entry ends the walk, since everything after it
///   is older;
/// * on a first run (empty `seen`) the walk ends once [`BOOTSTRAP_CAP`]
///   entries are selected.
pub fn select_new<'a>(entries: &'a [Entry], seen: &SeenSet, now: DateTime<Utc>) -> Selection<'a> {
    let first_run = seen.is_empty();
    let mut selection = Selection::default();

    for entry in entries {
        let fingerprint = Fingerprint::of(entry);

        if is_stale(entry, now) {
            continue;
        }
        if seen.contains(&fingerprint) {
            break;
        }
        if first_run && selection.len() >= BOOTSTRAP_CAP {
            break;
        }

        selection.entries.push(entry);
        selection.fingerprints.push(fingerprint);
    }

    selection
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
