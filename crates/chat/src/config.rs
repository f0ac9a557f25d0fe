//! Configuration loading for the chat client
//!
//! Settings are resolved in this order (later wins):
//! 1. Built-in defaults
//! 2. A JSON file: an explicit path, or ~/.config/parlor/client.json if present
//! 3. Environment variables (`PARLOR_API_URL`, `PARLOR_API_TOKEN`, `PARLOR_TIMEOUT_SECS`)

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state::DraftPolicy;

/// Client config filename in the Parlor config directory
pub const CLIENT_CONFIG_FILE: &str = "client.json";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_API_URL: &str = "PARLOR_API_URL";
const ENV_API_TOKEN: &str = "PARLOR_API_TOKEN";
const ENV_TIMEOUT_SECS: &str = "PARLOR_TIMEOUT_SECS";

/// Settings for talking to the message server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Whole-request timeout
    pub timeout_secs: u64,
    /// Bearer token supplied by the external login flow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Compose draft handling after a failed post
    pub draft_policy: DraftPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth_token: None,
            draft_policy: DraftPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load from the default config file (if any) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path` (or the default file) and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let base: Self = match path {
            Some(path) => config::load_json_file(path)?,
            None => match config::ConfigDir::default_location() {
                Some(dir) if dir.exists(CLIENT_CONFIG_FILE) => dir.load_json(CLIENT_CONFIG_FILE)?,
                _ => Self::default(),
            },
        };
        base.with_env(|key| std::env::var(key).ok())?.validated()
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Self =
            serde_json::from_str(json).context("Failed to parse client config JSON")?;
        parsed.validated()
    }

    /// Overlay values found by `lookup` (normally the process environment)
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.auth_token = if token.is_empty() { None } else { Some(token) };
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
        }
        Ok(self)
    }

    /// Check the settings and normalize the base URL (no trailing slash)
    pub fn validated(mut self) -> Result<Self> {
        let url = url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("API base URL must use http or https: {}", self.base_url);
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Get the default config file path (~/.config/parlor/client.json)
    pub fn default_config_path() -> Option<PathBuf> {
        config::config_path(CLIENT_CONFIG_FILE)
    }

    /// Write these settings to the default config file
    pub fn save(&self) -> Result<PathBuf> {
        let dir = config::ConfigDir::default_location()
            .context("Could not determine config directory")?;
        dir.save_json(CLIENT_CONFIG_FILE, self)
    }
}
