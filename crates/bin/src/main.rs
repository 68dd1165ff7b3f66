mod cli;
mod commands;
mod output;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::grocery::PartialCheckout;
use crate::output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("larder=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let (larder, path) = store::open(&cli.store).await?;
    let tenant = cli.store.tenant.as_deref();

    let outcome = match &cli.command {
        Commands::Grocery { command } => {
            commands::grocery::run(command, &larder, tenant, format).await
        }
        Commands::Fridge { command } => commands::fridge::run(command, &larder, tenant, format).await,
    };

    match outcome {
        Ok(true) => store::save(&larder, &path).await,
        Ok(false) => Ok(()),
        Err(err) if err.is::<PartialCheckout>() => {
            tracing::warn!("Checkout stopped part way, saving what moved");
            store::save(&larder, &path).await?;
            Err(err)
        }
        Err(err) => Err(err),
    }
}
