//! Sector reference entries and the merged (price + sector) row.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::price::PriceRow;

/// One row of the sector reference sheet.
///
/// `raw_symbol` is `None` when the cell was empty; the canonical symbol is
/// then also `None` and can never match a price symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorEntry {
    pub raw_symbol: Option<String>,
    pub canonical_symbol: Option<String>,
    pub sector: Option<String>,
}

/// Sector entries, unique by canonical symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorTable {
    pub entries: Vec<SectorEntry>,
    pub duplicates_dropped: usize,
}

impl SectorTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join index: canonical symbol → sector (which may itself be empty).
    pub fn index(&self) -> HashMap<&str, Option<&str>> {
        self.entries
            .iter()
            .filter_map(|e| {
                e.canonical_symbol
                    .as_deref()
                    .map(|sym| (sym, e.sector.as_deref()))
            })
            .collect()
    }
}

/// A price row extended with the sector of its symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    #[serde(flatten)]
    pub price: PriceRow,
    pub sector: Option<String>,
}
