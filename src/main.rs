//! rss-bot — forward new RSS entries into a Zulip stream.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐  Feed   ┌───────────┐ entries ┌────────────┐ Message ┌──────────┐
//! │ source/   │ ──────► │ cursor.rs │ ──────► │ message.rs │ ──────► │ zulip.rs │
//! │ (fetch)   │         │ (select)  │         │ (format)   │         │ (send)   │
//! └───────────┘         └───────────┘         └────────────┘         └──────────┘
//!                             ▲ │ append fingerprints
//!                             │ ▼
//!                       <data-dir>/<host>
//! ```
//!
//! * **`source/`** — the `DataSource` trait, the `Feed`/`Entry` types and
//!   the RSS implementation.
//! * **`cursor`** — entry fingerprints, per-feed seen-sets and the rules for
//!   which entries are new.
//! * **`message`** — turns an entry into a stream message.
//! * **`zulip`** — the `MessageSender` trait and the HTTP client.
//! * **`poll`** — one sequential pass over all feeds.
//! * **`cli`**, **`config`**, **`logging`**, **`error`** — plumbing.
//! * **`main`** — wires everything together and runs once.

mod cli;
mod config;
mod cursor;
mod error;
mod logging;
mod message;
mod poll;
mod source;
mod zulip;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use cli::Args;
use config::ZulipConfig;
use cursor::SeenStore;
use message::Formatter;
use poll::Poller;
use source::{DataSource, RssSource};
use zulip::ZulipClient;

fn main() -> Result<()> {
    let args = Args::parse();

    // -- data directory and logging -----------------------------------------
    let data_dir = args.data_dir();
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let _log_guard = logging::init(&data_dir);

    if let Err(e) = run(&args) {
        error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    // -- feeds ---------------------------------------------------------------
    let feed_urls = source::load_feed_list(&args.feed_file())?;

    // -- Zulip connection ----------------------------------------------------
    let config = ZulipConfig::resolve(args.overrides(), args.config_file().as_deref())?;
    let client = ZulipClient::new(&config)?;

    let http = zulip::http_client()?;
    let sources: Vec<Box<dyn DataSource>> = feed_urls
        .into_iter()
        .map(|url| Box::new(RssSource::new(url, http.clone())) as Box<dyn DataSource>)
        .collect();

    // -- one pass over every feed --------------------------------------------
    let formatter = Formatter {
        stream: args.stream.clone(),
        topic: args.topic.clone(),
        unwrap: args.unwrap,
        math: args.math,
    };
    let mut poller = Poller::new(&client, SeenStore::new(args.data_dir()), formatter);
    let summary = poller.run(&sources)?;

    info!(
        feeds = summary.feeds,
        failed_feeds = summary.failed_feeds,
        sent = summary.sent,
        failed = summary.failed,
        "run complete"
    );
    Ok(())
}
