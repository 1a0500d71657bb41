//! Stockdash reporting: Markdown dashboard rendering and CSV/JSON/Parquet
//! exports of a pipeline run.

pub mod export;
pub mod markdown;

pub use export::{
    export_correlation_csv, export_merged_parquet, export_metrics_json, export_sectors_csv,
    export_volatility_csv, export_yearly_csv, save_exports,
};
pub use markdown::{MarkdownReport, PREVIEW_ROWS};
