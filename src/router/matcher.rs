//! Path/method resolution over a resource's route table.
//!
//! # Resolution order
//!
//! 1. Every route whose pattern matches the request path is a candidate.
//! 2. The first candidate (registration order) whose method equals the request
//!    method wins, wherever it sits relative to `ANY` routes.
//! 3. Otherwise the first candidate bound to `ANY` wins.
//! 4. Otherwise there is no match.
//!
//! This lets a resource register a catch-all first and specialise sub-paths
//! and methods afterwards without reordering.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

use super::pattern::split_segments;
use super::table::{Resource, Route, RouteMethod};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Bound path parameters, in pattern order.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// The route selected for a request and the parameters its pattern bound.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    pub route: &'r Route,
    pub path_params: ParamVec,
}

impl RouteMatch<'_> {
    /// Get a path parameter by name (last write wins).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| &**k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolve `path` and `method` against `resource`.
///
/// `method` is `None` when the inbound method string was empty or not a valid
/// token; such requests can only be served by `ANY` routes.
#[must_use]
pub fn match_route<'r>(
    resource: &'r Resource,
    path: &str,
    method: Option<&Method>,
) -> Option<RouteMatch<'r>> {
    let segments = split_segments(path);

    debug!(
        path = %path,
        method = ?method,
        routes = resource.routes().len(),
        "Route match attempt"
    );

    let mut fallback: Option<RouteMatch<'r>> = None;
    let mut params = ParamVec::new();

    for route in resource.routes() {
        let is_exact = match (&route.method, method) {
            (RouteMethod::Exact(m), Some(req)) => m == req,
            (RouteMethod::Exact(_), None) => false,
            (RouteMethod::Any, _) => {
                // Only the first ANY candidate can ever be used.
                if fallback.is_some() {
                    continue;
                }
                false
            }
        };
        if !is_exact && !route.method.is_any() {
            continue;
        }

        params.clear();
        if !route.pattern.matches(&segments, &mut params) {
            continue;
        }

        let candidate = RouteMatch {
            route,
            path_params: std::mem::take(&mut params),
        };
        if is_exact {
            debug!(
                path = %path,
                route_pattern = %route.pattern,
                route_method = %route.method,
                "Route matched"
            );
            return Some(candidate);
        }
        fallback = Some(candidate);
    }

    match &fallback {
        Some(m) => debug!(
            path = %path,
            route_pattern = %m.route.pattern,
            route_method = %m.route.method,
            "Route matched via ANY fallback"
        ),
        None => debug!(path = %path, method = ?method, "No route matched"),
    }
    fallback
}
