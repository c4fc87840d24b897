use http::Method;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::{CancelSignal, RequestContext};
use crate::ids::CallId;
use crate::registry::ResourceRegistry;
use crate::response::{ResponseCapture, ResponseEnvelope};
use crate::router::match_route;
use crate::runtime_config::DispatchConfig;
use crate::wire::CallResourceRequest;

/// A handler was invoked and reported failure.
///
/// Not-found outcomes never produce this; they are ordinary `404` envelopes.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler for {method} {resource}{path} failed: {source}")]
    Handler {
        call_id: CallId,
        resource: String,
        path: String,
        method: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Resolves resource calls against a frozen registry and runs the handler.
#[derive(Debug, Clone)]
pub struct ResourceDispatcher {
    registry: Arc<ResourceRegistry>,
    config: DispatchConfig,
}

impl ResourceDispatcher {
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self {
            registry,
            config: DispatchConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatch one call with no cancellation signal.
    pub fn dispatch(&self, req: CallResourceRequest) -> Result<ResponseEnvelope, DispatchError> {
        self.dispatch_with_cancel(req, CancelSignal::new())
    }

    /// Dispatch one call.
    ///
    /// 1. Unknown resource → `404`, no handler runs.
    /// 2. No route for path and method → `404`, no handler runs.
    /// 3. Otherwise the handler runs once, on this thread, against a fresh
    ///    capture, and the finished capture is returned.
    ///
    /// `cancel` is handed to the handler through the context; it is never
    /// enforced here.
    pub fn dispatch_with_cancel(
        &self,
        req: CallResourceRequest,
        cancel: CancelSignal,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let call_id = CallId::from_header_or_new(
            req.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-call-id"))
                .and_then(|(_, v)| v.first())
                .map(String::as_str),
        );

        // D1: Resource lookup
        let Some(resource) = self.registry.lookup(&req.resource_name) else {
            debug!(
                call_id = %call_id,
                resource = %req.resource_name,
                available_resources = self.registry.len(),
                "Resource not found"
            );
            return Ok(self.not_found("resource not found"));
        };

        let method = parse_method(&req.method);

        // D2: Route resolution
        let Some(route_match) = match_route(resource, &req.resource_path, method.as_ref()) else {
            debug!(
                call_id = %call_id,
                resource = %req.resource_name,
                path = %req.resource_path,
                method = %req.method,
                "No route for resource call"
            );
            return Ok(self.not_found("route not found"));
        };

        let handler = Arc::clone(route_match.route.handler());
        let route_pattern = route_match.route.pattern().to_string();
        let route_method = route_match.route.method().to_string();

        let ctx = RequestContext::from_call(call_id, req, method, route_match.path_params, cancel);

        // D3: Handler invocation
        info!(
            call_id = %call_id,
            resource = %ctx.resource_name,
            path = %ctx.path,
            method = %ctx.raw_method,
            route_pattern = %route_pattern,
            route_method = %route_method,
            path_params = ?ctx.path_params,
            "Resource call dispatched to handler"
        );

        let mut capture = ResponseCapture::new();
        let start = Instant::now();
        let outcome = handler.handle(&ctx, &mut capture);
        let elapsed = start.elapsed();

        if elapsed > self.config.slow_handler_threshold {
            warn!(
                call_id = %call_id,
                resource = %ctx.resource_name,
                route_pattern = %route_pattern,
                duration_ms = elapsed.as_millis() as u64,
                cancelled = ctx.is_cancelled(),
                "Slow resource handler detected"
            );
        }

        if let Err(source) = outcome {
            return Err(DispatchError::Handler {
                call_id,
                resource: ctx.resource_name,
                path: ctx.path,
                method: ctx.raw_method,
                source,
            });
        }

        // D4: Finalize
        let envelope = capture.finish();
        info!(
            call_id = %call_id,
            resource = %ctx.resource_name,
            status = envelope.status,
            body_len = envelope.body.len(),
            duration_us = elapsed.as_micros() as u64,
            "Resource call complete"
        );
        Ok(envelope)
    }

    fn not_found(&self, reason: &str) -> ResponseEnvelope {
        if self.config.not_found_body {
            ResponseEnvelope::error(404, reason)
        } else {
            ResponseEnvelope::not_found()
        }
    }
}

/// `None` for empty or syntactically invalid method strings.
///
/// Method tokens are case-sensitive: `get` is an extension method, not `GET`.
#[must_use]
pub fn parse_method(raw: &str) -> Option<Method> {
    if raw.is_empty() {
        return None;
    }
    Method::from_bytes(raw.as_bytes()).ok()
}
