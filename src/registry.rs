//! # Resource Registry
//!
//! Maps resource names to their route tables. Built once during plugin setup
//! through [`RegistryBuilder`], then frozen: a [`ResourceRegistry`] has no
//! mutating methods, so it can be shared behind an `Arc` and read from any
//! number of threads without locking.
//!
//! ```rust
//! use resource_router::registry::ResourceRegistry;
//! use resource_router::router::{Resource, RouteMethod};
//! use resource_router::handler::handler_fn;
//!
//! let registry = ResourceRegistry::builder()
//!     .register(
//!         "test",
//!         Resource::builder("/").route("/", RouteMethod::Any, handler_fn(|_, _| Ok(()))),
//!     )
//!     .unwrap()
//!     .build();
//! assert!(registry.lookup("test").is_some());
//! assert!(registry.lookup("missing").is_none());
//! ```

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::router::{PatternError, Resource, ResourceBuilder};

/// Setup-time registration failure. The registry must not be served after one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("resource '{0}' is already registered")]
    DuplicateResource(String),
    #[error("resource name must not be empty")]
    EmptyName,
    #[error("invalid route pattern in resource '{resource}': {source}")]
    Pattern {
        resource: String,
        #[source]
        source: PatternError,
    },
}

/// Anything that can become a [`Resource`] at registration.
pub trait IntoResource {
    fn into_resource(self) -> Result<Resource, PatternError>;
}

impl IntoResource for Resource {
    fn into_resource(self) -> Result<Resource, PatternError> {
        Ok(self)
    }
}

impl IntoResource for ResourceBuilder {
    fn into_resource(self) -> Result<Resource, PatternError> {
        self.build()
    }
}

/// Accumulates resources before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    resources: HashMap<String, Resource>,
    order: Vec<String>,
}

impl RegistryBuilder {
    /// Register `resource` under `name`.
    pub fn register(
        mut self,
        name: impl Into<String>,
        resource: impl IntoResource,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.resources.contains_key(&name) {
            return Err(RegistryError::DuplicateResource(name));
        }
        let resource = resource
            .into_resource()
            .map_err(|source| RegistryError::Pattern {
                resource: name.clone(),
                source,
            })?;

        debug!(
            resource = %name,
            base_path = %resource.base_path(),
            routes = resource.routes().len(),
            "Resource registered"
        );
        self.order.push(name.clone());
        self.resources.insert(name, resource);
        Ok(self)
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> ResourceRegistry {
        let route_count: usize = self.resources.values().map(|r| r.routes().len()).sum();
        let routes_summary: Vec<String> = self
            .order
            .iter()
            .filter_map(|name| self.resources.get(name).map(|r| (name, r)))
            .flat_map(|(name, r)| {
                r.routes()
                    .iter()
                    .map(move |route| format!("{name}: {} {}", route.method(), route.pattern()))
            })
            .take(10)
            .collect();

        info!(
            resources_count = self.resources.len(),
            routes_count = route_count,
            routes_summary = ?routes_summary,
            "Resource registry loaded"
        );

        ResourceRegistry {
            resources: self.resources,
            order: self.order,
        }
    }
}

/// Immutable name → resource map.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Resource>,
    order: Vec<String>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The resource registered under `name`.
    #[inline]
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Resource names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Resources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.order
            .iter()
            .filter_map(|name| self.resources.get(name).map(|r| (name.as_str(), r)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
