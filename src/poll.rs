//! One polling run over every configured feed.
//!
//! Feeds are handled strictly one after another: fetch, select new entries,
//! send them, append their fingerprints. Nothing is retried; a failing feed
//! is logged and skipped until the next run.
//!
//! The very first message of a run is special. If the server rejects it the
//! run aborts, because a wrong stream name or bad credentials would
//! otherwise produce the same error for every entry of every feed.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::cursor::{self, SeenStore};
use crate::error::BotError;
use crate::message::Formatter;
use crate::source::DataSource;
use crate::zulip::MessageSender;

/// Totals for a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Feeds fetched and recorded.
    pub feeds: usize,
    /// Feeds skipped because they could not be fetched or keyed.
    pub failed_feeds: usize,
    /// Messages accepted by the server.
    pub sent: usize,
    /// Messages attempted but rejected or lost.
    pub failed: usize,
}

/// Everything a run needs, passed explicitly instead of living in globals.
pub struct Poller<'a> {
    sender: &'a dyn MessageSender,
    store: SeenStore,
    formatter: Formatter,
    /// No message has been attempted yet in this run.
    first_message: bool,
}

impl<'a> Poller<'a> {
    pub fn new(sender: &'a dyn MessageSender, store: SeenStore, formatter: Formatter) -> Self {
        Self {
            sender,
            store,
            formatter,
            first_message: true,
        }
    }

    /// Process every source once, using the current time for staleness.
    pub fn run(&mut self, sources: &[Box<dyn DataSource>]) -> Result<RunSummary, BotError> {
        self.run_at(sources, Utc::now())
    }

    /// Process every source once as of `now`.
    pub fn run_at(
        &mut self,
        sources: &[Box<dyn DataSource>],
        now: DateTime<Utc>,
    ) -> Result<RunSummary, BotError> {
        let mut summary = RunSummary::default();
        for src in sources {
            self.poll_feed(src.as_ref(), now, &mut summary)?;
        }
        Ok(summary)
    }

    fn poll_feed(
        &mut self,
        src: &dyn DataSource,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Result<(), BotError> {
        let url = src.url();

        let Some(path) = self.store.path_for(url) else {
            error!(feed = url, "feed URL has no host, skipping");
            summary.failed_feeds += 1;
            return Ok(());
        };

        let seen = self.store.load(&path);
        debug!(feed = url, seen = seen.len(), "loaded seen-set");

        let feed = match src.fetch() {
            Ok(feed) => feed,
            Err(e) => {
                error!(feed = url, "Error fetching {url}: {e:#}");
                summary.failed_feeds += 1;
                return Ok(());
            }
        };

        let selection = cursor::select_new(&feed.entries, &seen, now);
        let feed_name = feed.display_name(url);
        let mut sent = 0;
        let mut failed = 0;

        for entry in &selection.entries {
            let message = self.formatter.build(entry, feed_name);
            let failure = match self.sender.send(&message) {
                Ok(resp) if resp.is_success() => None,
                Ok(resp) => Some(resp.to_string()),
                Err(e) => Some(format!("{e:#}")),
            };

            match failure {
                None => sent += 1,
                Some(detail) => {
                    error!(feed = url, entry = %entry.id, "Error processing {url}");
                    error!(feed = url, "{detail}");
                    if self.first_message {
                        return Err(BotError::FirstMessage {
                            feed_url: url.to_string(),
                            detail,
                        });
                    }
                    // Likely a malformed entry; it is still marked as seen.
                    failed += 1;
                }
            }
            self.first_message = false;
        }

        self.store
            .append(&path, &selection.fingerprints)
            .map_err(|source| BotError::Persist {
                path: path.clone(),
                source,
            })?;
        summary.feeds += 1;
        summary.sent += sent;
        summary.failed += failed;

        info!(feed = url, failed, "{sent} new messages sent for {url}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
