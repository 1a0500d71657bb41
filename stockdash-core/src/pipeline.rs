//! One-shot pipeline: load prices and sectors, merge, derive metrics.
//!
//! Stages run strictly in order and each hands an immutable `Arc` to the
//! next. Every stage is memoized on the content hash of its input, so a
//! `Pipeline` can be re-run cheaply while its inputs are unchanged.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::Memo;
use crate::config::{ConfigError, ReportConfig};
use crate::data::{
    hash_files, load_sectors, merge_sectors, ContentHash, DateParser, FingerprintError,
    LoadError, MergedTable, PriceLoader, SectorError,
};
use crate::domain::{PriceTable, SectorTable};
use crate::metrics::Metrics;

/// Errors that stop the pipeline before any metric is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("price data error: {0}")]
    Prices(#[from] LoadError),
    #[error("sector data error: {0}")]
    Sectors(#[from] SectorError),
    #[error("input error: {0}")]
    Fingerprint(#[from] FingerprintError),
}

/// A non-fatal data-quality finding, reported next to the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    NoPriceFiles,
    MissingSector { rows: usize, symbols: Vec<String> },
    EmptySector { rows: usize, symbols: Vec<String> },
    SkippedRows { bad_dates: usize, bad_closes: usize },
    DuplicatePriceRows { dropped: usize },
    DuplicateSectorEntries { dropped: usize },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPriceFiles => write!(f, "no price files found"),
            Self::MissingSector { rows, symbols } => write!(
                f,
                "some stocks missing sector info: {rows} rows across {} symbols ({})",
                symbols.len(),
                symbols.join(", ")
            ),
            Self::EmptySector { rows, symbols } => write!(
                f,
                "some stocks missing sector info: {rows} rows across {} symbols have an empty sector ({})",
                symbols.len(),
                symbols.join(", ")
            ),
            Self::SkippedRows {
                bad_dates,
                bad_closes,
            } => write!(
                f,
                "skipped {bad_dates} rows with unparseable dates and {bad_closes} rows with unparseable closes"
            ),
            Self::DuplicatePriceRows { dropped } => {
                write!(f, "dropped {dropped} duplicate (symbol, date) price rows")
            }
            Self::DuplicateSectorEntries { dropped } => {
                write!(f, "dropped {dropped} duplicate sector entries")
            }
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub prices: Arc<PriceTable>,
    pub sectors: Arc<SectorTable>,
    pub merged: Arc<MergedTable>,
    pub metrics: Arc<Metrics>,
    pub dataset_hash: ContentHash,
}

impl PipelineOutput {
    /// Data-quality findings of this run, in pipeline order.
    pub fn warnings(&self) -> Vec<DataWarning> {
        let mut warnings = Vec::new();
        let summary = &self.prices.summary;

        if self.prices.symbols.is_empty() {
            warnings.push(DataWarning::NoPriceFiles);
        }
        if summary.bad_date_rows > 0 || summary.bad_close_rows > 0 {
            warnings.push(DataWarning::SkippedRows {
                bad_dates: summary.bad_date_rows,
                bad_closes: summary.bad_close_rows,
            });
        }
        if summary.duplicates_dropped > 0 {
            warnings.push(DataWarning::DuplicatePriceRows {
                dropped: summary.duplicates_dropped,
            });
        }
        if self.sectors.duplicates_dropped > 0 {
            warnings.push(DataWarning::DuplicateSectorEntries {
                dropped: self.sectors.duplicates_dropped,
            });
        }
        if self.merged.unmatched_rows > 0 {
            warnings.push(DataWarning::MissingSector {
                rows: self.merged.unmatched_rows,
                symbols: self.merged.unmatched_symbols.clone(),
            });
        }
        let empty_rows = self.merged.rows_without_sector() - self.merged.unmatched_rows;
        if empty_rows > 0 {
            let mut symbols: Vec<String> = Vec::new();
            for row in self.merged.rows.iter().filter(|r| r.sector.is_none()) {
                let symbol = &row.price.symbol;
                if !self.merged.unmatched_symbols.contains(symbol) && !symbols.contains(symbol) {
                    symbols.push(symbol.clone());
                }
            }
            warnings.push(DataWarning::EmptySector {
                rows: empty_rows,
                symbols,
            });
        }
        warnings
    }
}

/// The memoized load → merge → derive pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: ReportConfig,
    loader: PriceLoader,
    prices: Memo<PriceTable>,
    sectors: Memo<SectorTable>,
    merged: Memo<MergedTable>,
    metrics: Memo<Metrics>,
}

impl Pipeline {
    pub fn new(config: ReportConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let loader = PriceLoader::new(
            config.price_extension.clone(),
            DateParser::new(config.date_formats.clone()),
        );
        Ok(Self {
            config,
            loader,
            prices: Memo::new("prices"),
            sectors: Memo::new("sectors"),
            merged: Memo::new("merge"),
            metrics: Memo::new("metrics"),
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Run every stage, reusing memoized results for unchanged inputs.
    pub fn run(&mut self) -> Result<PipelineOutput, PipelineError> {
        let price_dir = self.config.price_dir.clone();
        let sector_file = self.config.sector_file.clone();

        // Both inputs must exist before anything is read.
        if !price_dir.is_dir() {
            return Err(LoadError::MissingDirectory { path: price_dir }.into());
        }
        if !sector_file.is_file() {
            return Err(SectorError::MissingFile { path: sector_file }.into());
        }

        let files = self.loader.discover(&price_dir)?;
        let price_key = hash_files(
            &format!(
                "prices\0{}\0{}",
                self.config.price_extension,
                self.config.date_formats.join("\0")
            ),
            files.iter().map(|f| f.path.as_path()),
        )?;
        let sector_key = hash_files("sectors", [sector_file.as_path()])?;

        let loader = &self.loader;
        let prices = self
            .prices
            .get_or_try_insert_with(price_key, || loader.load_dir(&price_dir))?;
        let sectors = self
            .sectors
            .get_or_try_insert_with(sector_key, || load_sectors(&sector_file))?;

        let merge_key = ContentHash::combine("merge", &[price_key, sector_key]);
        let merged = self
            .merged
            .get_or_try_insert_with(merge_key, || {
                Ok::<_, PipelineError>(merge_sectors(&prices, &sectors))
            })?;

        let dataset_hash = merged.dataset_hash();
        let top_n = self.config.top_n;
        let metrics_key = ContentHash::combine(&format!("metrics\0{top_n}"), &[dataset_hash]);
        let metrics = self
            .metrics
            .get_or_try_insert_with(metrics_key, || {
                Ok::<_, PipelineError>(Metrics::derive(&merged, top_n))
            })?;

        let output = PipelineOutput {
            prices,
            sectors,
            merged,
            metrics,
            dataset_hash,
        };
        for warning in output.warnings() {
            warn!("{warning}");
        }
        info!(dataset = %output.dataset_hash, "pipeline complete");
        Ok(output)
    }

    /// Memo hits across all stages since construction.
    pub fn memo_hits(&self) -> u64 {
        self.prices.hits() + self.sectors.hits() + self.merged.hits() + self.metrics.hits()
    }
}
