//! Stockdash CLI: load the price directory and sector file, print the
//! Markdown dashboard, and optionally write the export bundle.
//!
//! Settings come from `$STOCKDASH_CONFIG` or `./stockdash.toml`; the two
//! positional arguments override the configured input paths.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stockdash_core::{Pipeline, ReportConfig};
use stockdash_report::{save_exports, MarkdownReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stockdash",
    about = "Stockdash: returns, volatility, sector and correlation report over daily price CSVs"
)]
struct Cli {
    /// Directory of per-symbol price files. Defaults to the configured `price_dir`.
    price_dir: Option<PathBuf>,

    /// Sector mapping CSV. Defaults to the configured `sector_file`.
    sector_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stockdash=info,stockdash_core=info,stockdash_report=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ReportConfig::discover().context("failed to load configuration")?;
    if let Some(dir) = cli.price_dir {
        config.price_dir = dir;
    }
    if let Some(file) = cli.sector_file {
        config.sector_file = file;
    }
    info!(
        price_dir = %config.price_dir.display(),
        sector_file = %config.sector_file.display(),
        "starting"
    );

    let mut pipeline = Pipeline::new(config)?;
    let output = pipeline.run()?;

    println!("{}", MarkdownReport.generate(&output));

    if let Some(dir) = &pipeline.config().export_dir {
        let run_dir = save_exports(&output, dir)?;
        eprintln!("Exports saved to {}", run_dir.display());
    }

    Ok(())
}
