//! # Runtime Configuration Module
//!
//! Tunables for the dispatcher and the transport-boundary adapter.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables. Later layers override earlier ones.
//!
//! ## Environment Variables
//!
//! ### `RESROUTER_SLOW_HANDLER_MS`
//!
//! Handlers running longer than this are logged at WARN. Default: `1000`.
//!
//! ### `RESROUTER_NOT_FOUND_BODY`
//!
//! When `true`, 404 envelopes carry a JSON `{"error": ...}` body instead of an
//! empty one. Default: `false`.
//!
//! ### `RESROUTER_HANDLER_FAILURE`
//!
//! What the adapter does when a handler returns an error or panics:
//! `internal-error` (reply with a 500 envelope, default) or `propagate`
//! (return an RPC-level error to the transport).
//!
//! ## TOML
//!
//! ```toml
//! slow_handler_ms = 250
//! not_found_body = true
//! handler_failure = "propagate"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// How handler failures are reported by [`crate::adapter::PluginAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerFailurePolicy {
    /// Reply with a `500` envelope carrying a JSON error document.
    #[default]
    InternalError,
    /// Surface the failure as an RPC-level error.
    Propagate,
}

impl HandlerFailurePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "internal-error" | "internal_error" | "500" => Some(Self::InternalError),
            "propagate" | "error" => Some(Self::Propagate),
            _ => None,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub slow_handler_threshold: Duration,
    pub not_found_body: bool,
    pub handler_failure: HandlerFailurePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            slow_handler_threshold: Duration::from_millis(1000),
            not_found_body: false,
            handler_failure: HandlerFailurePolicy::InternalError,
        }
    }
}

/// On-disk shape; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    slow_handler_ms: Option<u64>,
    not_found_body: Option<bool>,
    handler_failure: Option<HandlerFailurePolicy>,
}

impl DispatchConfig {
    /// Defaults overridden by environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    /// Defaults, then the TOML file at `path`, then environment variables.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Defaults overridden by a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(raw)?;
        let mut config = Self::default();
        if let Some(ms) = file.slow_handler_ms {
            config.slow_handler_threshold = Duration::from_millis(ms);
        }
        if let Some(flag) = file.not_found_body {
            config.not_found_body = flag;
        }
        if let Some(policy) = file.handler_failure {
            config.handler_failure = policy;
        }
        Ok(config)
    }

    /// Unparseable values are ignored and the current value kept.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(ms) = var("RESROUTER_SLOW_HANDLER_MS").and_then(|s| s.parse().ok()) {
            self.slow_handler_threshold = Duration::from_millis(ms);
        }
        if let Some(flag) = var("RESROUTER_NOT_FOUND_BODY").and_then(|s| s.parse().ok()) {
            self.not_found_body = flag;
        }
        if let Some(policy) =
            var("RESROUTER_HANDLER_FAILURE").and_then(|s| HandlerFailurePolicy::parse(&s))
        {
            self.handler_failure = policy;
        }
    }
}
