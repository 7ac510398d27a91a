//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;

/// Post new entries of the feeds listed in the feed file into a Zulip stream.
///
/// Meant to run periodically (e.g. from cron). Each run sends what appeared
/// since the previous one; a feed seen for the first time contributes only
/// its three newest entries.
#[derive(Parser, Debug)]
#[command(name = "rss-bot", author, version, about)]
pub struct Args {
    /// Stream to send the messages to.
    #[arg(long, default_value = "rss")]
    pub stream: String,

    /// Topic for every message. Defaults to the feed's title.
    #[arg(long)]
    pub topic: Option<String>,

    /// Directory for seen-entry records and the log file
    /// [default: ~/.cache/zulip-rss].
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File with one feed URL per line [default: ~/.cache/zulip-rss/rss-feeds].
    #[arg(long)]
    pub feed_file: Option<PathBuf>,

    /// Convert word-wrapped paragraphs into single lines.
    #[arg(long)]
    pub unwrap: bool,

    /// Rewrite `$` math delimiters to `$$`.
    #[arg(long)]
    pub math: bool,

    /// zuliprc holding email, key and site [default: ~/.zuliprc].
    #[arg(long, env = "ZULIP_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Bot email address.
    #[arg(long, env = "ZULIP_EMAIL")]
    pub user: Option<String>,

    /// Bot API key.
    #[arg(long, env = "ZULIP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Zulip server URL.
    #[arg(long, env = "ZULIP_SITE")]
    pub site: Option<String>,
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("zulip-rss")
}

impl Args {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn feed_file(&self) -> PathBuf {
        self.feed_file
            .clone()
            .unwrap_or_else(|| default_cache_dir().join("rss-feeds"))
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_file
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".zuliprc")))
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            email: self.user.clone(),
            api_key: self.api_key.clone(),
            site: self.site.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "rss-bot",
            "--stream",
            "news",
            "--topic",
            "daily",
            "--data-dir",
            "/tmp/rss",
            "--feed-file",
            "/tmp/feeds",
            "--unwrap",
            "--math",
            "--user",
            "bot@example.com",
            "--api-key",
            "k",
            "--site",
            "chat.example.com",
        ])
        .unwrap();

        assert_eq!(args.stream, "news");
        assert_eq!(args.topic.as_deref(), Some("daily"));
        assert_eq!(args.data_dir(), PathBuf::from("/tmp/rss"));
        assert_eq!(args.feed_file(), PathBuf::from("/tmp/feeds"));
        assert!(args.unwrap && args.math);
        assert_eq!(args.overrides().email.as_deref(), Some("bot@example.com"));
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["rss-bot"]).unwrap();
        assert_eq!(args.stream, "rss");
        assert!(args.topic.is_none());
        assert!(!args.unwrap && !args.math);
        assert!(args.data_dir().ends_with(".cache/zulip-rss"));
        assert!(args.feed_file().ends_with(".cache/zulip-rss/rss-feeds"));
    }
}
