//! # resource-router
//!
//! Resource-call routing and dispatch for backend plugins.
//!
//! ## Overview
//!
//! A host process forwards opaque "resource calls" to a plugin: a resource
//! name, a sub-path, a method string, headers and a body. This crate resolves
//! each call against a table of named resources, invokes exactly one handler,
//! and returns a single status/headers/body envelope. It also exports a
//! description of the registered resources for the host's schema call.
//!
//! ## Architecture
//!
//! - **[`router`]** - Route patterns, per-resource route tables and the
//!   method-precedence matcher
//! - **[`registry`]** - Immutable name to resource map built at setup
//! - **[`dispatcher`]** - Per-call resolution, context construction and handler invocation
//! - **[`response`]** - The handler write surface and the captured envelope
//! - **[`schema`]** - Schema providers and export
//! - **[`adapter`]** - RPC-facing entry point; converts handler failures and panics
//! - **[`wire`]** - Request/reply shapes exchanged with the host
//! - **[`runtime_config`]** / **[`logging`]** - Dispatcher knobs and tracing setup
//! - **[`cli`]** - `resource-router` debugging binary
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use resource_router::{
//!     handler_fn, CallResourceRequest, PluginAdapter, Resource, ResourceRegistry, RouteMethod,
//! };
//!
//! let registry = ResourceRegistry::builder()
//!     .register(
//!         "test",
//!         Resource::builder("/test/:id").route(
//!             "/get",
//!             RouteMethod::GET,
//!             handler_fn(|ctx, w| {
//!                 let id = ctx.get_path_param("id").unwrap_or_default().to_string();
//!                 w.write_text(200, &id);
//!                 Ok(())
//!             }),
//!         ),
//!     )
//!     .unwrap()
//!     .build();
//!
//! let adapter = PluginAdapter::new(Arc::new(registry));
//! let res = adapter
//!     .call_resource(CallResourceRequest::new("test", "/test/7/get", "GET"))
//!     .unwrap();
//! assert_eq!(res.code, 200);
//! assert_eq!(&res.body[..], b"7");
//! ```

pub mod adapter;
pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod echo;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod wire;

pub use adapter::{AdapterError, PluginAdapter};
pub use context::{CancelSignal, RequestContext};
pub use dispatcher::{DispatchError, ResourceDispatcher};
pub use handler::{handler_fn, ResourceHandler};
pub use ids::CallId;
pub use registry::{RegistryBuilder, RegistryError, ResourceRegistry};
pub use response::{ResponseCapture, ResponseEnvelope, ResponseWriter};
pub use router::{Resource, RouteMethod};
pub use runtime_config::{DispatchConfig, HandlerFailurePolicy};
pub use schema::{ResourceSchema, SchemaExporter, SchemaProvider, SchemaView};
pub use wire::{CallResourceRequest, CallResourceResponse, GetSchemaRequest, GetSchemaResponse};
