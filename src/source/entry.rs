//! The feed and entry types shared by every source.
//!
//! A source converts its native format into a [`Feed`] of [`Entry`] values so
//! the cursor and the message formatter never need to know where an entry
//! came from.

use chrono::{DateTime, Utc};

/// One fetched feed: its optional title and its entries in the order the
/// source returned them (expected newest-first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    /// Channel title, if the feed declares a non-empty one.
    pub title: Option<String>,
    pub entries: Vec<Entry>,
}

impl Feed {
    /// Name used as the message topic: the title, or the feed URL when the
    /// feed has no title.
    pub fn display_name<'a>(&'a self, url: &'a str) -> &'a str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => url,
        }
    }
}

/// A single feed entry, normalised from any data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stable identifier used for fingerprinting.
    ///
    /// For RSS this is the `<guid>` element, falling back to `<link>`.
    pub id: String,

    /// Timestamp exactly as the feed wrote it (published, else updated).
    ///
    /// Kept verbatim so fingerprints do not depend on date parsing.
    pub timestamp: Option<String>,

    /// `timestamp` parsed to UTC. `None` when absent or unparseable; such
    /// entries are never considered stale.
    pub published: Option<DateTime<Utc>>,

    pub title: String,

    /// URL to the full content.
    pub link: Option<String>,

    /// Summary or body, usually HTML.
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_title() {
        let feed = Feed {
            title: Some("Planet Rust".to_string()),
            entries: vec![],
        };
        assert_eq!(feed.display_name("https://example.com/rss"), "Planet Rust");
    }

    #[test]
    fn display_name_falls_back_to_url() {
        let untitled = Feed::default();
        assert_eq!(untitled.display_name("https://example.com/rss"), "https://example.com/rss");

        let blank = Feed {
            title: Some("   ".to_string()),
            entries: vec![],
        };
        assert_eq!(blank.display_name("https://example.com/rss"), "https://example.com/rss");
    }
}
