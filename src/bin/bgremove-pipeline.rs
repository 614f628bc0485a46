//! Background removal pipeline CLI tool
//!
//! Command-line frontend for the bgremove-pipeline controller: submits an
//! image to an external removal capability and saves the processed result.

#[cfg(feature = "cli")]
use bgremove_pipeline::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
