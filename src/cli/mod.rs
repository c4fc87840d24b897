//! # CLI Module
//!
//! A small debugging front end for resource tables. Routes are declared in a
//! TOML resources file and every route is served by the echo handler, so the
//! output shows exactly which route a call resolved to and what it bound.
//!
//! ## Commands
//!
//! ```bash
//! resource-router routes --file resources.toml
//! resource-router schema --file resources.toml
//! resource-router call --file resources.toml --resource test --path /test/7/get --method GET
//! ```
//!
//! `call` prints the reply envelope (`code`, `headers`, `body`) as JSON; an
//! unmatched call prints `code: 404`.

mod commands;

pub use commands::{run, run_cli, Cli, Commands, ResourceDecl, ResourcesFile, RouteDecl};
