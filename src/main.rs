use resource_router::cli::run_cli;
use resource_router::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let _guard = init_logging(&LogConfig::from_env())?;
    run_cli()
}
