//! stockdash core: loading, reconciliation and metrics for historical stock prices.
//!
//! Data flows one way:
//! - Price loader: a directory of per-symbol CSV files → one deduplicated table
//! - Sector loader: a reference sheet → entries unique by canonical symbol
//! - Reconciliation merge: left join of prices onto sectors
//! - Metrics: daily/whole-period returns, volatility, sector averages, correlation
//!
//! [`pipeline::Pipeline`] chains the stages and memoizes each one on the
//! content hash of its input.

pub mod cache;
pub mod config;
pub mod data;
pub mod domain;
pub mod metrics;
pub mod pipeline;

pub use config::{ConfigError, ReportConfig};
pub use data::{LoadError, MergedTable, SectorError};
pub use metrics::Metrics;
pub use pipeline::{DataWarning, Pipeline, PipelineError, PipelineOutput};
