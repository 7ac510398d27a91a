//! RSS feed source implementation.
//!
//! Fetches a feed document over HTTP with a blocking [`reqwest`] client and
//! converts it into a [`Feed`]. RSS 2.0 goes through the [`rss`] crate;
//! anything it rejects (Atom, RSS 1.0, JSON Feed) is handed to [`feed_rs`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;

use super::{DataSource, Entry, Feed};

/// A feed data source: RSS 2.0, with Atom and other formats as fallback.
pub struct RssSource {
    /// The feed URL to fetch.
    pub url: String,
    client: Client,
}

impl RssSource {
    /// Create a new RSS source sharing `client` with the other sources.
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Parse an already-fetched [`rss::Channel`] into a [`Feed`].
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// parsing logic without hitting the network.
    pub fn parse_channel(channel: &rss::Channel) -> Feed {
        let entries = channel
            .items()
            .iter()
            .map(|item| {
                // Prefer <guid>, fall back to <link>, then empty string.
                let id = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .or_else(|| item.link().map(String::from))
                    .unwrap_or_default();

                // <pubDate> is the published time; a Dublin Core <dc:date>
                // stands in as the updated time.
                let timestamp = item
                    .pub_date()
                    .map(String::from)
                    .or_else(|| {
                        item.dublin_core_ext()
                            .and_then(|dc| dc.dates().first().cloned())
                    })
                    .filter(|t| !t.trim().is_empty());

                let published = timestamp.as_deref().and_then(parse_timestamp);

                Entry {
                    id,
                    timestamp,
                    published,
                    title: item.title().unwrap_or("(untitled)").to_string(),
                    link: item.link().map(String::from),
                    summary: item
                        .description()
                        .or_else(|| item.content())
                        .map(String::from),
                }
            })
            .collect();

        let title = Some(channel.title().trim())
            .filter(|t| !t.is_empty())
            .map(String::from);

        Feed { title, entries }
    }

    /// Parse a fetched document, trying RSS 2.0 first.
    pub fn parse_bytes(body: &[u8]) -> Result<Feed> {
        match rss::Channel::read_from(body) {
            Ok(channel) => Ok(Self::parse_channel(&channel)),
            Err(rss_err) => {
                let parsed = feed_rs::parser::parse(body)
                    .with_context(|| format!("not RSS ({rss_err}) and not Atom"))?;
                Ok(Self::parse_feed(parsed))
            }
        }
    }

    /// Convert a [`feed_rs`] document (typically Atom) into a [`Feed`].
    ///
    /// `feed_rs` only exposes parsed dates, so the RFC 3339 rendering of the
    /// published (else updated) time is the entry's raw timestamp.
    pub fn parse_feed(parsed: feed_rs::model::Feed) -> Feed {
        let entries = parsed
            .entries
            .into_iter()
            .map(|entry| {
                let published = entry.published.or(entry.updated);
                let link = entry.links.first().map(|l| l.href.clone());
                let id = Some(entry.id)
                    .filter(|id| !id.is_empty())
                    .or_else(|| link.clone())
                    .unwrap_or_default();

                Entry {
                    id,
                    timestamp: published.map(|dt| dt.to_rfc3339()),
                    published,
                    title: entry
                        .title
                        .map(|t| t.content)
                        .unwrap_or_else(|| "(untitled)".to_string()),
                    link,
                    summary: entry
                        .summary
                        .map(|s| s.content)
                        .or_else(|| entry.content.and_then(|c| c.body)),
                }
            })
            .collect();

        let title = parsed
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());

        Feed { title, entries }
    }
}

/// RFC 2822 is what RSS mandates; RFC 3339 covers `dc:date` and feeds that
/// ignore the standard. Anything else is treated as undated.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl DataSource for RssSource {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Feed> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("fetching {}", self.url))?
            .bytes()?;
        Self::parse_bytes(body.as_ref()).with_context(|| format!("parsing {}", self.url))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(xml: &str) -> Feed {
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        RssSource::parse_channel(&channel)
    }

    #[test]
    fn parse_channel_extracts_entries() {
        let feed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>First Post</title>
      <link>https://example.com/1</link>
      <guid>guid-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
      <description>First description</description>
    </item>
    <item>
      <title>Second Post</title>
      <link>https://example.com/2</link>
      <guid>guid-2</guid>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(feed.title.as_deref(), Some("Test Feed"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.id, "guid-1");
        assert_eq!(first.title, "First Post");
        assert_eq!(first.link.as_deref(), Some("https://example.com/1"));
        assert_eq!(first.summary.as_deref(), Some("First description"));
        assert_eq!(first.timestamp.as_deref(), Some("Mon, 01 Jan 2024 00:00:00 +0000"));
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );

        assert_eq!(feed.entries[1].id, "guid-2");
        assert!(feed.entries[1].summary.is_none());
    }

    #[test]
    fn falls_back_to_link_when_no_guid() {
        let feed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>No GUID</title>
      <link>https://example.com/no-guid</link>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(feed.entries[0].id, "https://example.com/no-guid");
        assert!(feed.entries[0].timestamp.is_none());
    }

    #[test]
    fn handles_missing_title() {
        let feed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title></title>
    <item>
      <guid>g1</guid>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(feed.entries[0].title, "(untitled)");
        assert!(feed.title.is_none());
    }

    #[test]
    fn invalid_date_keeps_raw_timestamp_but_is_undated() {
        let feed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <guid>g1</guid>
      <title>Bad Date</title>
      <pubDate>not-a-real-date</pubDate>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(feed.entries[0].timestamp.as_deref(), Some("not-a-real-date"));
        assert!(feed.entries[0].published.is_none());
    }

    #[test]
    fn dublin_core_date_is_used_when_pub_date_missing() {
        let feed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Test</title>
    <item>
      <guid>g1</guid>
      <dc:date>2025-03-04T05:06:07Z</dc:date>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(feed.entries[0].timestamp.as_deref(), Some("2025-03-04T05:06:07Z"));
        assert_eq!(
            feed.entries[0].published,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap())
        );
    }

    #[test]
    fn atom_feed_is_parsed() {
        let feed = RssSource::parse_bytes(
            br#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test</title>
  <id>urn:uuid:feed</id>
  <updated>2025-03-05T00:00:00Z</updated>
  <entry>
    <title>Atom Post</title>
    <id>urn:uuid:entry-1</id>
    <link href="https://example.com/atom/1"/>
    <published>2025-03-04T05:06:07Z</published>
    <updated>2025-03-05T00:00:00Z</updated>
    <summary>Short summary</summary>
  </entry>
  <entry>
    <title>Updated Only</title>
    <id>urn:uuid:entry-2</id>
    <updated>2025-03-01T00:00:00Z</updated>
    <content type="html">&lt;p&gt;Body&lt;/p&gt;</content>
  </entry>
</feed>"#,
        )
        .unwrap();

        assert_eq!(feed.title.as_deref(), Some("Atom Test"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.id, "urn:uuid:entry-1");
        assert_eq!(first.title, "Atom Post");
        assert_eq!(first.link.as_deref(), Some("https://example.com/atom/1"));
        assert_eq!(first.summary.as_deref(), Some("Short summary"));
        assert_eq!(
            first.published,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap())
        );
        assert_eq!(first.timestamp.as_deref(), Some("2025-03-04T05:06:07+00:00"));

        let second = &feed.entries[1];
        assert_eq!(
            second.published,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
        assert!(second.summary.as_deref().unwrap_or_default().contains("Body"));
    }

    #[test]
    fn rss_documents_keep_the_raw_pub_date() {
        let feed = RssSource::parse_bytes(
            br#"<rss version="2.0"><channel><title>T</title>
<item><guid>g1</guid><pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate></item>
</channel></rss>"#,
        )
        .unwrap();

        assert_eq!(feed.entries[0].timestamp.as_deref(), Some("Mon, 01 Jan 2024 00:00:00 +0000"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(RssSource::parse_bytes(b"<html><body>not a feed</body></html>").is_err());
    }

    #[test]
    fn url_returns_feed_url() {
        let src = RssSource::new("http://example.com/feed", Client::new());
        assert_eq!(src.url(), "http://example.com/feed");
    }
}
