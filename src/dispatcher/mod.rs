//! # Dispatcher Module
//!
//! Entry point for inbound resource calls.
//!
//! ## Overview
//!
//! [`ResourceDispatcher::dispatch`] takes a
//! [`CallResourceRequest`](crate::wire::CallResourceRequest) and:
//!
//! 1. Looks the resource up in the frozen
//!    [`ResourceRegistry`](crate::registry::ResourceRegistry)
//! 2. Resolves the route with [`match_route`](crate::router::match_route)
//! 3. Builds a fresh [`RequestContext`](crate::context::RequestContext) with
//!    the bound path parameters
//! 4. Invokes the handler exactly once, synchronously, against a fresh
//!    [`ResponseCapture`](crate::response::ResponseCapture)
//! 5. Returns the finished [`ResponseEnvelope`](crate::response::ResponseEnvelope)
//!
//! ## Error Handling
//!
//! - Unknown resources and unmatched routes are `Ok` envelopes with status 404
//! - A handler returning `Err` becomes [`DispatchError::Handler`]
//! - Handler panics are not caught here; the transport boundary
//!   ([`crate::adapter`]) owns that decision
//!
//! No retries happen: each call is a single attempt. The dispatcher holds no
//! per-call state, so one instance serves any number of threads at once.

mod core;

pub use core::{parse_method, DispatchError, ResourceDispatcher};
