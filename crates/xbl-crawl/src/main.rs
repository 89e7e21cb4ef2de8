//! xbl-crawl CLI binary.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use xbl_crawl::cli::Cli;

/// Main entry point for the xbl-crawl CLI.
///
/// The crawl is strictly sequential, so a current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Progress, warnings and errors, timestamped HH:MM:SS.
    // Example: RUST_LOG=xbl_crawl=debug xbl-crawl --seed alice
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xbl_crawl=info")),
        )
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    let report = cli.execute().await?;

    tracing::debug!(
        expanded = report.expanded,
        recorded = report.recorded,
        "xbl-crawl completed"
    );
    Ok(())
}
