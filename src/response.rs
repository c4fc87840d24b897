//! Response capture for single-shot resource calls.
//!
//! Handlers are written against [`ResponseWriter`], the usual
//! status/headers/body surface. There is no socket behind it: a
//! [`ResponseCapture`] accumulates the writes and [`ResponseCapture::finish`]
//! turns them into an immutable [`ResponseEnvelope`] for the RPC reply.
//!
//! ## Status rules
//!
//! - The first [`ResponseWriter::write_status`] wins; later calls are ignored.
//! - A body write before any status fixes the status to `200`.
//! - A capture that is never written to finishes as `200` with an empty body.

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Status used when a handler never writes one.
pub const DEFAULT_STATUS: u16 = 200;

/// Header name to ordered values. Not validated at this layer.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Write surface handed to resource handlers.
pub trait ResponseWriter {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut Headers;

    /// Set the status code. Only the first call has an effect.
    fn write_status(&mut self, status: u16);

    /// Append bytes to the body.
    fn write(&mut self, chunk: &[u8]);
}

impl dyn ResponseWriter + '_ {
    /// Append `value` to header `name`.
    ///
    /// Names compare case-insensitively: the value joins an existing entry
    /// under its original spelling.
    pub fn add_header(&mut self, name: &str, value: impl Into<String>) {
        let headers = self.headers_mut();
        let key = headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.to_string());
        headers.entry(key).or_default().push(value.into());
    }

    /// Replace all values of header `name`, whatever the spelling of the
    /// existing entries.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let headers = self.headers_mut();
        headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        headers.insert(name.to_string(), vec![value.into()]);
    }

    /// Write a plain text body with the given status.
    pub fn write_text(&mut self, status: u16, text: &str) {
        self.set_header("Content-Type", "text/plain; charset=utf-8");
        self.write_status(status);
        self.write(text.as_bytes());
    }

    /// Serialize `value` as the JSON body with the given status.
    pub fn write_json<T: Serialize + ?Sized>(
        &mut self,
        status: u16,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.set_header("Content-Type", "application/json");
        self.write_status(status);
        self.write(&body);
        Ok(())
    }
}

/// Finalised result of one resource call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl ResponseEnvelope {
    /// An envelope with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Empty-bodied `404`.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(404, Bytes::new())
    }

    /// JSON error document `{"error": message}` with the given status.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        let mut env = Self::new(status, body);
        env.headers
            .insert("Content-Type".to_string(), vec!["application/json".to_string()]);
        env
    }

    /// First value of a header, case-insensitive.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }
}

/// Per-call accumulator behind [`ResponseWriter`].
#[derive(Debug, Default)]
pub struct ResponseCapture {
    status: Option<u16>,
    headers: Headers,
    body: BytesMut,
}

impl ResponseCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status written so far, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Freeze the captured writes.
    #[must_use]
    pub fn finish(self) -> ResponseEnvelope {
        ResponseEnvelope {
            status: self.status.unwrap_or(DEFAULT_STATUS),
            headers: self.headers,
            body: self.body.freeze(),
        }
    }
}

impl ResponseWriter for ResponseCapture {
    fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    fn write_status(&mut self, status: u16) {
        match self.status {
            None => self.status = Some(status),
            Some(current) => debug!(
                current_status = current,
                ignored_status = status,
                "Superfluous status write ignored"
            ),
        }
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(DEFAULT_STATUS);
        }
        self.body.extend_from_slice(chunk);
    }
}
