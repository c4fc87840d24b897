//! Schema export: an introspectable summary of the registered resources.
//!
//! The exporter is wired with an optional [`SchemaProvider`] at startup and
//! never reassigned. Each [`SchemaExporter::export`] calls the provider once and
//! returns its view untouched; without a provider the view is empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::registry::ResourceRegistry;

/// One route as seen by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSchema {
    pub path: String,
    pub method: String,
}

/// One resource as seen by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteSchema>,
}

impl ResourceSchema {
    /// A resource entry with only a base path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            routes: Vec::new(),
        }
    }
}

/// Resource name → schema entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaView {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSchema>,
}

impl SchemaView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }
}

impl<S: Into<String>> FromIterator<(S, ResourceSchema)> for SchemaView {
    fn from_iter<I: IntoIterator<Item = (S, ResourceSchema)>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Source of the schema view.
pub trait SchemaProvider: Send + Sync {
    fn schema(&self) -> SchemaView;
}

impl<F> SchemaProvider for F
where
    F: Fn() -> SchemaView + Send + Sync,
{
    fn schema(&self) -> SchemaView {
        self()
    }
}

impl SchemaProvider for ResourceRegistry {
    fn schema(&self) -> SchemaView {
        self.iter()
            .map(|(name, resource)| {
                let routes = resource
                    .routes()
                    .iter()
                    .map(|route| RouteSchema {
                        path: route.sub_path().to_string(),
                        method: route.method().to_string(),
                    })
                    .collect();
                (
                    name,
                    ResourceSchema {
                        path: resource.base_path().to_string(),
                        routes,
                    },
                )
            })
            .collect()
    }
}

/// Serves schema export calls.
#[derive(Clone, Default)]
pub struct SchemaExporter {
    provider: Option<Arc<dyn SchemaProvider>>,
}

impl SchemaExporter {
    #[must_use]
    pub fn new(provider: Option<Arc<dyn SchemaProvider>>) -> Self {
        Self { provider }
    }

    /// An exporter that always returns an empty view.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Produce the current schema view.
    #[must_use]
    pub fn export(&self) -> SchemaView {
        match &self.provider {
            Some(provider) => {
                let view = provider.schema();
                debug!(resources = view.len(), "Schema exported");
                view
            }
            None => {
                debug!("Schema exported without a provider");
                SchemaView::default()
            }
        }
    }
}

impl std::fmt::Debug for SchemaExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaExporter")
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}
