//! Outbound stream messages and their formatting.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::source::Entry;

/// Longest topic Zulip accepts without truncation.
pub const MAX_TOPIC_LENGTH: usize = 60;

/// A stream message as posted to the messages API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Always `"stream"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Destination stream name.
    pub to: String,
    pub subject: String,
    pub content: String,
}

/// Formatting options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub stream: String,
    /// Fixed topic for every message instead of the feed name.
    pub topic: Option<String>,
    /// Join hard-wrapped lines inside paragraphs.
    pub unwrap: bool,
    /// Double `$` so math delimiters survive Zulip's markdown.
    pub math: bool,
}

impl Formatter {
    /// Build the message announcing `entry` from the feed named `feed_name`.
    pub fn build(&self, entry: &Entry, feed_name: &str) -> Message {
        let link = entry.link.as_deref().unwrap_or_default();

        let mut body = entry.summary.clone().unwrap_or_default();
        if self.unwrap {
            body = unwrap_text(&body);
        }

        let mut content = format!(
            "**[{}]({})**\n{}\n{}",
            entry.title,
            link,
            strip_tags(&body),
            link
        );
        if self.math {
            content = content.replace('$', "$$");
        }

        let subject = match &self.topic {
            Some(topic) => topic.clone(),
            None => elide_subject(feed_name),
        };

        Message {
            kind: "stream",
            to: self.stream.clone(),
            subject,
            content,
        }
    }
}

/// Shorten a topic to [`MAX_TOPIC_LENGTH`] characters, ending in `...`.
pub fn elide_subject(subject: &str) -> String {
    if subject.chars().count() <= MAX_TOPIC_LENGTH {
        return subject.to_string();
    }
    let head: String = subject.chars().take(MAX_TOPIC_LENGTH - 3).collect();
    format!("{}...", head.trim_end())
}

/// Replace each newline that sits between two other characters with a
/// space. Runs of newlines (paragraph breaks) and newlines at either end of
/// the body are kept.
pub fn unwrap_text(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let joined = c == '\n'
                && i > 0
                && chars[i - 1] != '\n'
                && chars.get(i + 1).is_some_and(|&next| next != '\n');
            if joined {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Drop HTML tags and decode entities, keeping only the text.
pub fn strip_tags(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid tag regex"));
    html_escape::decode_html_entities(&tag.replace_all(html, "")).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
