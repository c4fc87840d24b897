//! Route tables: the ordered routes a single resource exposes.

use http::Method;
use std::fmt;
use std::sync::Arc;

use super::pattern::{PatternError, RoutePattern};
use crate::handler::ResourceHandler;

/// Method a route is bound to.
///
/// `Any` is the fallback binding: it serves every request method for which the
/// same path has no exact-method route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Any,
    Exact(Method),
}

impl RouteMethod {
    pub const GET: RouteMethod = RouteMethod::Exact(Method::GET);
    pub const PUT: RouteMethod = RouteMethod::Exact(Method::PUT);
    pub const POST: RouteMethod = RouteMethod::Exact(Method::POST);
    pub const DELETE: RouteMethod = RouteMethod::Exact(Method::DELETE);
    pub const PATCH: RouteMethod = RouteMethod::Exact(Method::PATCH);
    pub const HEAD: RouteMethod = RouteMethod::Exact(Method::HEAD);
    pub const OPTIONS: RouteMethod = RouteMethod::Exact(Method::OPTIONS);

    /// Parse a method string as it appears in a route declaration.
    ///
    /// `ANY` (any case) and `*` select the fallback binding; anything else must be a
    /// valid HTTP method token.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s == "*" || s.eq_ignore_ascii_case("any") {
            return Some(RouteMethod::Any);
        }
        Method::from_bytes(s.to_ascii_uppercase().as_bytes())
            .ok()
            .map(RouteMethod::Exact)
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, RouteMethod::Any)
    }
}

impl From<Method> for RouteMethod {
    fn from(method: Method) -> Self {
        RouteMethod::Exact(method)
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Any => f.write_str("ANY"),
            RouteMethod::Exact(m) => f.write_str(m.as_str()),
        }
    }
}

/// A single (pattern, method, handler) binding.
#[derive(Clone)]
pub struct Route {
    pub(crate) sub_path: String,
    pub(crate) pattern: RoutePattern,
    pub(crate) method: RouteMethod,
    pub(crate) handler: Arc<dyn ResourceHandler>,
}

impl Route {
    /// The sub-path as registered, relative to the resource base path.
    #[must_use]
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    /// The compiled pattern including the resource base path.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    #[must_use]
    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ResourceHandler> {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.to_string())
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// A routable resource: a base path and its ordered route table.
///
/// Built once through [`Resource::builder`] and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Resource {
    base_path: String,
    routes: Vec<Route>,
}

impl Resource {
    /// Start a route table rooted at `base_path`.
    pub fn builder(base_path: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder {
            base_path: base_path.into(),
            routes: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Chained builder for a [`Resource`].
///
/// Pattern errors are recorded on the first bad route and reported by
/// [`ResourceBuilder::build`], so a chain of `.route(..)` calls stays readable.
pub struct ResourceBuilder {
    base_path: String,
    routes: Vec<Route>,
    error: Option<PatternError>,
}

impl ResourceBuilder {
    /// Append a route. Later routes never shadow earlier ones of the same method.
    #[must_use]
    pub fn route<H>(mut self, sub_path: &str, method: RouteMethod, handler: H) -> Self
    where
        H: ResourceHandler + 'static,
    {
        self.push(sub_path, method, Arc::new(handler));
        self
    }

    /// Append a route whose handler is already shared.
    #[must_use]
    pub fn route_shared(
        mut self,
        sub_path: &str,
        method: RouteMethod,
        handler: Arc<dyn ResourceHandler>,
    ) -> Self {
        self.push(sub_path, method, handler);
        self
    }

    fn push(&mut self, sub_path: &str, method: RouteMethod, handler: Arc<dyn ResourceHandler>) {
        if self.error.is_some() {
            return;
        }
        match RoutePattern::join(&self.base_path, sub_path) {
            Ok(pattern) => self.routes.push(Route {
                sub_path: sub_path.to_string(),
                pattern,
                method,
                handler,
            }),
            Err(e) => self.error = Some(e),
        }
    }

    /// Freeze the route table.
    pub fn build(self) -> Result<Resource, PatternError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        // The base path on its own must also be a valid pattern.
        RoutePattern::parse(&self.base_path)?;
        Ok(Resource {
            base_path: self.base_path,
            routes: self.routes,
        })
    }
}
