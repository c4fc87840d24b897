//! # Router Module
//!
//! Route tables and path/method resolution for resource calls.
//!
//! ## Overview
//!
//! Each registered [`Resource`] owns a base path and an ordered list of
//! [`Route`]s. A route binds a sub-path pattern and a [`RouteMethod`] to a
//! handler. At call time [`match_route`] scans the table and picks exactly one
//! route, or none.
//!
//! ## Architecture
//!
//! 1. **Compilation**: at registration, `base path ++ sub-path` is split into
//!    segments and compiled into a [`RoutePattern`] (literals, `:name`/`{name}`
//!    parameters, and a trailing `*`/`*name` wildcard). Malformed patterns are
//!    rejected with a [`PatternError`].
//!
//! 2. **Matching**: the request sub-path goes through the same segmentation and
//!    is tested against every route. Exact-method routes beat `ANY` routes
//!    regardless of registration order; ties inside each group go to the route
//!    registered first.
//!
//! ## Example
//!
//! ```rust
//! use resource_router::router::{match_route, Resource, RouteMethod};
//! use resource_router::handler::handler_fn;
//! use http::Method;
//!
//! let resource = Resource::builder("/users")
//!     .route("/", RouteMethod::Any, handler_fn(|_, w| {
//!         w.write_status(200);
//!         Ok(())
//!     }))
//!     .route("/:id", RouteMethod::GET, handler_fn(|_, w| {
//!         w.write_status(200);
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let m = match_route(&resource, "/users/42", Some(&Method::GET)).unwrap();
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```

mod matcher;
mod pattern;
mod table;

pub use matcher::{match_route, ParamVec, RouteMatch, MAX_INLINE_PARAMS};
pub use pattern::{split_segments, PatternError, RoutePattern, Segment, WILDCARD_PARAM};
pub use table::{Resource, ResourceBuilder, Route, RouteMethod};
