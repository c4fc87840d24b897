//! Per-call request context handed to resource handlers.

use bytes::Bytes;
use http::Method;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ids::CallId;
use crate::response::Headers;
use crate::router::ParamVec;
use crate::wire::{CallResourceRequest, PluginContext};

/// Advisory cancellation for a running call.
///
/// The dispatcher never interrupts a handler. Handlers that do long work are
/// expected to poll [`CancelSignal::is_cancelled`] and give up on their own.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that also reports cancelled once `timeout` has elapsed.
    ///
    /// A timeout too large to represent as an `Instant` (e.g. `Duration::MAX`)
    /// means no deadline.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Cancel every clone of this signal.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when no deadline is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

/// Everything a handler may read about the call it serves.
///
/// Built fresh by the dispatcher for each call and dropped when the call
/// returns.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub call_id: CallId,
    pub plugin_context: PluginContext,
    pub resource_name: String,
    /// Sub-path as received, before segmentation.
    pub path: String,
    /// Parsed method; `None` when the inbound string was empty or invalid.
    pub method: Option<Method>,
    /// Method string as received.
    pub raw_method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Bytes,
    pub path_params: ParamVec,
    pub query_params: Vec<(String, String)>,
    pub cancel: CancelSignal,
}

impl RequestContext {
    pub(crate) fn from_call(
        call_id: CallId,
        req: CallResourceRequest,
        method: Option<Method>,
        path_params: ParamVec,
        cancel: CancelSignal,
    ) -> Self {
        let query_params = parse_query(&req.url, &req.resource_path);
        Self {
            call_id,
            plugin_context: req.plugin_context,
            resource_name: req.resource_name,
            path: req.resource_path,
            method,
            raw_method: req.method,
            url: req.url,
            headers: req.headers,
            body: req.body,
            path_params,
            query_params,
            cancel,
        }
    }

    /// Path parameter by name (last write wins).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| &**k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Query parameter by name (last write wins).
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value of a request header, case-insensitive.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }

    /// Deserialize the body as JSON.
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Query pairs from the call URL, falling back to a `?` suffix on the path.
fn parse_query(url: &str, path: &str) -> Vec<(String, String)> {
    let query = url
        .split_once('?')
        .or_else(|| path.split_once('?'))
        .map(|(_, q)| q)
        .unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
