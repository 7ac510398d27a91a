//! Run-level errors: the failures that end a run early.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Unable to read feed file at {}.", path.display())]
    FeedFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The first message of the run was rejected; most likely the stream or
    /// the credentials are wrong, so every later message would fail too.
    #[error("Failed to process first message (feed {feed_url}): {detail}")]
    FirstMessage { feed_url: String, detail: String },

    #[error("failed to record seen entries in {}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("missing Zulip configuration: {0}")]
    Config(String),
}
