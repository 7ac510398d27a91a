//! Sending messages to a Zulip server.
//!
//! The poller only sees the [`MessageSender`] trait; [`ZulipClient`] is the
//! HTTP implementation used by the binary.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::ZulipConfig;
use crate::message::Message;

/// User agent sent with every request, feed fetches included.
pub const USER_AGENT: &str = concat!("ZulipRSS/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of a messages API response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    /// `"success"` or `"error"`.
    pub result: String,
    #[serde(default)]
    pub msg: String,
    /// Error code, present on `"error"` results.
    #[serde(default)]
    pub code: Option<String>,
    /// Id of the created message, present on success.
    #[serde(default)]
    pub id: Option<u64>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "result={} msg={:?}", self.result, self.msg)?;
        if let Some(code) = &self.code {
            write!(f, " code={code}")?;
        }
        Ok(())
    }
}

/// Something that can deliver a [`Message`].
///
/// `Ok` carries the server's verdict, which may still be an error result;
/// `Err` means no verdict was obtained (network, decoding).
pub trait MessageSender {
    fn send(&self, message: &Message) -> Result<ApiResponse>;
}

/// Blocking client for the Zulip REST API.
pub struct ZulipClient {
    http: Client,
    endpoint: String,
    email: String,
    api_key: String,
}

impl ZulipClient {
    pub fn new(config: &ZulipConfig) -> Result<Self> {
        let http = http_client()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/v1/messages", normalize_site(&config.site)),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl MessageSender for ZulipClient {
    fn send(&self, message: &Message) -> Result<ApiResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.email, Some(&self.api_key))
            .form(message)
            .send()
            .with_context(|| format!("POST {}", self.endpoint))?;

        // Error results come back with 4xx statuses but a JSON body, so the
        // status is not checked here.
        let status = response.status();
        let body = response.text()?;
        serde_json::from_str(&body)
            .with_context(|| format!("unexpected response ({status}): {body}"))
    }
}

/// The blocking HTTP client shared by feed sources and the sender.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building HTTP client")
}

/// `chat.example.com` → `https://chat.example.com`; trailing slashes and a
/// trailing `/api` are removed.
pub fn normalize_site(site: &str) -> String {
    let site = site.trim().trim_end_matches('/');
    let site = site.strip_suffix("/api").unwrap_or(site);
    if site.starts_with("http://") || site.starts_with("https://") {
        site.to_string()
    } else {
        format!("https://{site}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
