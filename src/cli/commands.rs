use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapter::PluginAdapter;
use crate::echo::echo_handler;
use crate::registry::ResourceRegistry;
use crate::router::{Resource, RouteMethod};
use crate::runtime_config::DispatchConfig;
use crate::wire::{CallResourceRequest, GetSchemaRequest};

/// Command-line interface for inspecting and exercising a resource table
#[derive(Parser)]
#[command(name = "resource-router")]
#[command(about = "Resource router debugging CLI", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List every resource route in a resources file as JSON
    Routes {
        /// TOML resources file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the schema export for a resources file as JSON
    Schema {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Dispatch one call against echo handlers and print the reply as JSON
    Call {
        #[arg(short, long)]
        file: PathBuf,

        /// Resource name
        #[arg(short, long)]
        resource: String,

        /// Sub-path within the resource
        #[arg(short, long, default_value = "/")]
        path: String,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request body
        #[arg(short, long)]
        body: Option<String>,

        /// Dispatcher TOML config
        #[arg(long, env = "RESROUTER_CONFIG")]
        config: Option<PathBuf>,
    },
}

/// A route declaration in a resources file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDecl {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "ANY".to_string()
}

/// A resource declaration in a resources file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDecl {
    pub path: String,
    #[serde(default)]
    pub routes: Vec<RouteDecl>,
}

/// Top-level resources file.
///
/// ```toml
/// [resources.test]
/// path = "/test/:id"
/// routes = [
///   { path = "/", method = "ANY" },
///   { path = "/get", method = "GET" },
/// ]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcesFile {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDecl>,
}

impl ResourcesFile {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resources file {}", path.display()))?;
        Self::parse(&raw)
            .with_context(|| format!("Failed to parse resources file {}", path.display()))
    }

    /// Build a registry with every route served by [`echo_handler`].
    pub fn into_echo_registry(self) -> Result<ResourceRegistry> {
        let mut builder = ResourceRegistry::builder();
        for (name, decl) in self.resources {
            let mut resource = Resource::builder(decl.path);
            for route in decl.routes {
                let Some(method) = RouteMethod::parse(&route.method) else {
                    bail!("resource '{name}': invalid method '{}'", route.method);
                };
                resource = resource.route(&route.path, method, echo_handler);
            }
            builder = builder.register(name, resource)?;
        }
        Ok(builder.build())
    }
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run(cli.command)
}

pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Routes { file } => {
            let registry = ResourcesFile::load(&file)?.into_echo_registry()?;
            let listing: Vec<_> = registry
                .iter()
                .flat_map(|(name, resource)| {
                    resource.routes().iter().map(move |route| {
                        serde_json::json!({
                            "resource": name,
                            "method": route.method().to_string(),
                            "pattern": route.pattern().to_string(),
                        })
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Commands::Schema { file } => {
            let registry = ResourcesFile::load(&file)?.into_echo_registry()?;
            let adapter = PluginAdapter::new(Arc::new(registry)).with_registry_schema();
            let schema = adapter.get_schema(GetSchemaRequest::default());
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Call {
            file,
            resource,
            path,
            method,
            body,
            config,
        } => {
            let registry = ResourcesFile::load(&file)?.into_echo_registry()?;
            let config = match config {
                Some(p) => DispatchConfig::load(&p)?,
                None => DispatchConfig::from_env(),
            };
            let adapter = PluginAdapter::with_config(Arc::new(registry), config);
            let mut req = CallResourceRequest::new(resource, path, method);
            if let Some(body) = body {
                req = req.with_body(body.into_bytes());
            }
            let res = adapter.call_resource(req)?;
            let body: serde_json::Value = match serde_json::from_slice(&res.body) {
                Ok(v) => v,
                Err(_) => serde_json::Value::String(String::from_utf8_lossy(&res.body).into_owned()),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "code": res.code,
                    "headers": res.headers,
                    "body": body,
                }))?
            );
        }
    }
    Ok(())
}
