//! Message shapes exchanged with the plugin transport.
//!
//! These mirror the RPC messages one-to-one and are plain `serde` data; the
//! router never inspects [`PluginContext`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::response::{Headers, ResponseEnvelope};
use crate::schema::SchemaView;

/// Identity of the user on whose behalf a call is made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Datasource instance settings forwarded with a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSourceSettings {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub json_data: serde_json::Value,
    #[serde(default)]
    pub decrypted_secure_json_data: BTreeMap<String, String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated: i64,
}

/// Plugin/datasource configuration carried by every call. Opaque to routing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    #[serde(default)]
    pub org_id: i64,
    #[serde(default)]
    pub plugin_id: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub app_json_data: Option<serde_json::Value>,
    #[serde(default)]
    pub datasource: Option<DataSourceSettings>,
}

/// Inbound "call a named resource" message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallResourceRequest {
    #[serde(default)]
    pub plugin_context: PluginContext,
    pub resource_name: String,
    /// Sub-path within the resource; empty means root.
    #[serde(default)]
    pub resource_path: String,
    /// HTTP-style verb. Empty or unknown values only reach `ANY` routes.
    #[serde(default)]
    pub method: String,
    /// Original request URL including any query string.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Bytes,
}

impl CallResourceRequest {
    /// Shorthand for a body-less call.
    pub fn new(
        resource_name: impl Into<String>,
        resource_path: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            resource_path: resource_path.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Outbound reply to [`CallResourceRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResourceResponse {
    pub code: i32,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Bytes,
}

impl From<ResponseEnvelope> for CallResourceResponse {
    fn from(env: ResponseEnvelope) -> Self {
        Self {
            code: i32::from(env.status),
            headers: env.headers,
            body: env.body,
        }
    }
}

/// Schema export request. Carries nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSchemaRequest {}

/// Schema export reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSchemaResponse {
    #[serde(flatten)]
    pub schema: SchemaView,
}

impl GetSchemaResponse {
    #[must_use]
    pub fn resources(&self) -> &BTreeMap<String, crate::schema::ResourceSchema> {
        &self.schema.resources
    }
}
