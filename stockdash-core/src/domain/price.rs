//! Price rows and the unified per-symbol price table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily price row for a single symbol.
///
/// `close` is the only price column the metrics depend on; the remaining
/// OHLCV columns are carried through when present in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceRow {
    /// Row with only the required columns set.
    pub fn new(symbol: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Counters collected while loading a price directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub files_read: usize,
    pub rows_read: usize,
    /// Rows dropped because the date did not parse.
    pub bad_date_rows: usize,
    /// Rows dropped because the close was empty or not a finite number.
    pub bad_close_rows: usize,
    /// Rows dropped as repeats of an earlier (symbol, date).
    pub duplicates_dropped: usize,
}

/// Unified price table: every symbol's rows concatenated in discovery order.
///
/// Invariant: at most one row per (symbol, date).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    pub rows: Vec<PriceRow>,
    /// Symbols in discovery order, including symbols whose file had no rows.
    pub symbols: Vec<String>,
    pub summary: LoadSummary,
}

impl PriceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Date-ordered rows of a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub sector: Option<String>,
    pub rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Build a series from rows in any order. Rows are stably sorted by date.
    pub fn from_rows(
        symbol: impl Into<String>,
        sector: Option<String>,
        rows: impl IntoIterator<Item = PriceRow>,
    ) -> Self {
        let mut rows: Vec<PriceRow> = rows.into_iter().collect();
        rows.sort_by_key(|r| r.date);
        Self {
            symbol: symbol.into(),
            sector,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}
