//! Domain types for the stockdash pipeline.

pub mod price;
pub mod sector;

pub use price::{LoadSummary, PriceRow, PriceSeries, PriceTable};
pub use sector::{MergedRow, SectorEntry, SectorTable};
