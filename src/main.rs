use anyhow::Result;
use clap::Parser;
use toolscout::cli::Args;
use toolscout::launch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let query = args.query.clone();
    let config = args.into_config()?;

    let default_filter = if config.verbose {
        "toolscout=debug,warn"
    } else {
        "toolscout=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    launch(&config, query).await
}
