//! Transport-boundary adapter.
//!
//! The RPC transport talks to [`PluginAdapter`]. It owns the dispatcher and the
//! schema exporter and is the one place where handler failures (returned
//! errors and panics) are turned into something the transport can send back,
//! according to [`HandlerFailurePolicy`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::context::CancelSignal;
use crate::dispatcher::{DispatchError, ResourceDispatcher};
use crate::registry::ResourceRegistry;
use crate::response::ResponseEnvelope;
use crate::runtime_config::{DispatchConfig, HandlerFailurePolicy};
use crate::schema::{SchemaExporter, SchemaProvider};
use crate::wire::{CallResourceRequest, CallResourceResponse, GetSchemaRequest, GetSchemaResponse};

/// RPC-level failure of a resource call.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("handler for resource '{resource}' panicked: {message}")]
    HandlerPanicked { resource: String, message: String },
}

/// Plugin-side endpoint for resource calls and schema export.
#[derive(Debug, Clone)]
pub struct PluginAdapter {
    dispatcher: ResourceDispatcher,
    schema: SchemaExporter,
    failure_policy: HandlerFailurePolicy,
}

impl PluginAdapter {
    /// Adapter over `registry` with no schema provider.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: Arc<ResourceRegistry>, config: DispatchConfig) -> Self {
        Self {
            dispatcher: ResourceDispatcher::new(registry).with_config(config),
            schema: SchemaExporter::empty(),
            failure_policy: config.handler_failure,
        }
    }

    /// Install the schema provider. Done once at startup.
    #[must_use]
    pub fn with_schema_provider(mut self, provider: Arc<dyn SchemaProvider>) -> Self {
        self.schema = SchemaExporter::new(Some(provider));
        self
    }

    /// Export the registry itself as the schema.
    #[must_use]
    pub fn with_registry_schema(self) -> Self {
        let registry = Arc::clone(self.dispatcher.registry());
        self.with_schema_provider(registry)
    }

    #[must_use]
    pub fn dispatcher(&self) -> &ResourceDispatcher {
        &self.dispatcher
    }

    /// Handle a resource call.
    pub fn call_resource(
        &self,
        req: CallResourceRequest,
    ) -> Result<CallResourceResponse, AdapterError> {
        self.call_resource_with_cancel(req, CancelSignal::new())
    }

    /// Handle a resource call, forwarding the caller's cancellation signal.
    pub fn call_resource_with_cancel(
        &self,
        req: CallResourceRequest,
        cancel: CancelSignal,
    ) -> Result<CallResourceResponse, AdapterError> {
        let resource = req.resource_name.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.dispatcher.dispatch_with_cancel(req, cancel)
        }));

        match outcome {
            Ok(Ok(envelope)) => Ok(envelope.into()),
            Ok(Err(e)) => {
                error!(
                    resource = %resource,
                    error = %e,
                    error_chain = ?e,
                    policy = ?self.failure_policy,
                    "Resource handler failed"
                );
                match self.failure_policy {
                    HandlerFailurePolicy::InternalError => {
                        Ok(ResponseEnvelope::error(500, &e.to_string()).into())
                    }
                    HandlerFailurePolicy::Propagate => Err(e.into()),
                }
            }
            Err(panic) => {
                let message = panic_message(&*panic);
                error!(
                    resource = %resource,
                    panic_message = %message,
                    policy = ?self.failure_policy,
                    "Resource handler panicked - CRITICAL"
                );
                match self.failure_policy {
                    HandlerFailurePolicy::InternalError => Ok(ResponseEnvelope::error(
                        500,
                        &format!("handler panicked: {message}"),
                    )
                    .into()),
                    HandlerFailurePolicy::Propagate => {
                        Err(AdapterError::HandlerPanicked { resource, message })
                    }
                }
            }
        }
    }

    /// Handle a schema export call. Never fails.
    #[must_use]
    pub fn get_schema(&self, _req: GetSchemaRequest) -> GetSchemaResponse {
        GetSchemaResponse {
            schema: self.schema.export(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
