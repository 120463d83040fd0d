use anyhow::Result;
use clap::Parser;

use docflow::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Plugin credentials may come from a local .env file.
    dotenvy::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("docflow completed successfully"),
        Err(e) => tracing::error!(error = %e, "docflow exited with error"),
    }
    result
}
