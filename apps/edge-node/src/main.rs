//! EdgeLink demo node entry point.

mod app;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting EdgeLink node"
    );

    let variant = std::env::args().nth(1).unwrap_or_else(|| "hub".into());
    let options = app::demo_options(&variant)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(options))?;

    tracing::info!("node shut down cleanly");
    Ok(())
}
