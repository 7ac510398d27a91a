//! Zulip connection settings.
//!
//! Each field comes from the command line (or its environment variable) when
//! given, otherwise from the `[api]` section of a zuliprc file:
//!
//! ```text
//! [api]
//! email=rss-bot@chat.example.com
//! key=0123456789abcdef
//! site=https://chat.example.com
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::BotError;

/// Credentials and server for the messages API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZulipConfig {
    pub email: String,
    pub api_key: String,
    pub site: String,
}

/// Values given explicitly on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub site: Option<String>,
}

impl ZulipConfig {
    /// Merge `overrides` over the zuliprc at `path`. A missing zuliprc is
    /// fine as long as the overrides cover every field.
    pub fn resolve(overrides: Overrides, path: Option<&Path>) -> Result<Self, BotError> {
        let file = match path {
            Some(path) => match fs::read_to_string(path) {
                Ok(text) => parse_zuliprc(&text),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "zuliprc not read");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        let pick = |explicit: Option<String>, key: &str, flag: &str| {
            explicit
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.get(key).cloned())
                .ok_or_else(|| {
                    let origin = path
                        .map(|p| format!(" or `{key}` in {}", p.display()))
                        .unwrap_or_default();
                    BotError::Config(format!("set {flag}{origin}"))
                })
        };

        Ok(Self {
            email: pick(overrides.email, "email", "--user")?,
            api_key: pick(overrides.api_key, "key", "--api-key")?,
            site: pick(overrides.site, "site", "--site")?,
        })
    }
}

/// Key/value pairs of the `[api]` section. Comments (`#`, `;`) and other
/// sections are ignored.
fn parse_zuliprc(text: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut in_api = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_api = section.trim() == "api";
            continue;
        }
        if !in_api {
            continue;
        }
        if let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) {
            let value = value.trim();
            if !value.is_empty() {
                values.insert(key.trim().to_lowercase(), value.to_string());
            }
        }
    }

    values
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
