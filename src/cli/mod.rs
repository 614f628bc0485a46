//! Command-line frontend
//!
//! Thin presentation layer over the pipeline controller: parses arguments,
//! maps controller progress onto an indicatif bar, and writes the result
//! blob to disk under the `<epoch-millis>-bg-removed.png` naming convention.
//!
//! This module is only available when the "cli" feature is enabled.

use crate::capability::{BackgroundRemoval, HttpRemovalService, MockRemoval};
use crate::config::{InputRejection, PipelineConfig};
use crate::controller::PipelineController;
use crate::progress::{NoOpProgressReporter, ProgressReporter};
use crate::source::RawFile;
use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Background removal pipeline CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-pipeline")]
pub struct Cli {
    /// Input image file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory for the result file [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Remote removal service endpoint (offline mock keying when omitted)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the final controller view state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Progress reporter backed by an indicatif bar
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressReporter for BarReporter {
    fn on_started(&self, source_name: &str) {
        self.bar.set_message(format!("Removing background: {source_name}"));
    }

    fn on_progress(&self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn on_completed(&self, elapsed: Duration) {
        self.bar
            .finish_with_message(format!("done in {:.2}s", elapsed.as_secs_f64()));
    }

    fn on_error(&self, error: &str) {
        self.bar.abandon_with_message(format!("failed: {error}"));
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// CLI entry point
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let capability: Arc<dyn BackgroundRemoval> = match &cli.endpoint {
        Some(endpoint) => Arc::new(HttpRemovalService::new(endpoint.clone())?),
        None => Arc::new(MockRemoval::new()),
    };

    // Command-line submissions behave like drag-drop: arbitrary files can
    // arrive, so reject non-images loudly instead of silently.
    let config = PipelineConfig::builder()
        .input_rejection(InputRejection::Error)
        .build()?;

    let reporter: Arc<dyn ProgressReporter> = if cli.quiet {
        Arc::new(NoOpProgressReporter)
    } else {
        Arc::new(BarReporter::new())
    };

    let mut controller =
        PipelineController::with_config(capability, config).with_reporter(reporter);

    let file = RawFile::from_path(&cli.input)
        .await
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;
    controller.submit(file)?;

    let view = controller.wait().await;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    let Some(result) = &view.result else {
        bail!("background removal produced no result; see log output");
    };
    let blob = controller
        .resolve(result)
        .with_context(|| format!("result is an external reference ({result}); nothing to save"))?;

    let output_dir = cli.output_dir.unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("failed to create '{}'", output_dir.display()))?;
    let output_path = output_dir.join(controller.download_name());
    tokio::fs::write(&output_path, blob.bytes())
        .await
        .with_context(|| format!("failed to write '{}'", output_path.display()))?;

    if !cli.quiet {
        println!("Saved: {}", output_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_minimal_invocation() {
        let cli = Cli::parse_from(["bgremove-pipeline", "photo.jpg"]);
        assert_eq!(cli.input, PathBuf::from("photo.jpg"));
        assert!(cli.endpoint.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_parses_endpoint_and_output() {
        let cli = Cli::parse_from([
            "bgremove-pipeline",
            "photo.jpg",
            "--endpoint",
            "https://removal.example.com/v1/segment",
            "-o",
            "out",
            "-vv",
        ]);
        assert_eq!(
            cli.endpoint.as_deref(),
            Some("https://removal.example.com/v1/segment")
        );
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.verbose, 2);
    }
}
