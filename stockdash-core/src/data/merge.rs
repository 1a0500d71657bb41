//! Reconciliation merge: left join of price rows onto sector entries.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::fingerprint::ContentHash;
use crate::domain::{MergedRow, PriceSeries, PriceTable, SectorTable};

/// Price rows annotated with their sector.
///
/// Invariant: `rows.len()` equals the row count of the price table it was
/// built from. Price rows without a sector entry keep `sector: None` and are
/// counted in `unmatched_rows`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedTable {
    pub rows: Vec<MergedRow>,
    /// Symbols in discovery order.
    pub symbols: Vec<String>,
    /// Rows whose symbol has no sector entry.
    pub unmatched_rows: usize,
    /// Distinct unmatched symbols, in first-seen order.
    pub unmatched_symbols: Vec<String>,
}

/// Left-join `prices` to `sectors` on `symbol == canonical_symbol`.
pub fn merge_sectors(prices: &PriceTable, sectors: &SectorTable) -> MergedTable {
    let index = sectors.index();
    let mut merged = MergedTable {
        rows: Vec::with_capacity(prices.rows.len()),
        symbols: prices.symbols.clone(),
        ..Default::default()
    };

    let mut unmatched_seen: HashSet<&str> = HashSet::new();
    for row in &prices.rows {
        let sector = match index.get(row.symbol.as_str()) {
            Some(sector) => sector.map(str::to_owned),
            None => {
                merged.unmatched_rows += 1;
                if unmatched_seen.insert(row.symbol.as_str()) {
                    merged.unmatched_symbols.push(row.symbol.clone());
                }
                None
            }
        };
        merged.rows.push(MergedRow {
            price: row.clone(),
            sector,
        });
    }

    if merged.unmatched_rows > 0 {
        debug!(
            rows = merged.unmatched_rows,
            symbols = ?merged.unmatched_symbols,
            "some stocks missing sector info"
        );
    }
    info!(rows = merged.rows.len(), "merged price and sector data");
    merged
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose sector is null, whether unmatched or matched to an empty cell.
    pub fn rows_without_sector(&self) -> usize {
        self.rows.iter().filter(|r| r.sector.is_none()).count()
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> &[MergedRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// One date-ordered series per symbol that has rows, in discovery order.
    ///
    /// Symbols present in rows but missing from `symbols` follow, in
    /// first-seen row order.
    pub fn series(&self) -> Vec<PriceSeries> {
        let mut order: Vec<&str> = self.symbols.iter().map(String::as_str).collect();
        let mut grouped: HashMap<&str, Vec<&MergedRow>> = HashMap::new();
        for row in &self.rows {
            let symbol = row.price.symbol.as_str();
            if !grouped.contains_key(symbol) && !order.contains(&symbol) {
                order.push(symbol);
            }
            grouped.entry(symbol).or_default().push(row);
        }

        order
            .into_iter()
            .filter_map(|symbol| {
                let rows = grouped.remove(symbol)?;
                let sector = rows.iter().find_map(|r| r.sector.clone());
                Some(PriceSeries::from_rows(
                    symbol,
                    sector,
                    rows.into_iter().map(|r| r.price.clone()),
                ))
            })
            .collect()
    }

    /// Deterministic content hash over every merged row.
    pub fn dataset_hash(&self) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"merged-table");
        for symbol in &self.symbols {
            hasher.update(symbol.as_bytes());
            hasher.update(&[0]);
        }
        for row in &self.rows {
            let p = &row.price;
            hasher.update(p.symbol.as_bytes());
            hasher.update(&[0]);
            hasher.update(p.date.to_string().as_bytes());
            for v in [p.open, p.high, p.low, Some(p.close)] {
                hasher.update(&v.unwrap_or(f64::NAN).to_le_bytes());
            }
            hasher.update(&p.volume.unwrap_or(u64::MAX).to_le_bytes());
            match &row.sector {
                Some(s) => {
                    hasher.update(&[1]);
                    hasher.update(s.as_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            hasher.update(&[0]);
        }
        ContentHash::from(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceRow, SectorEntry};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn prices() -> PriceTable {
        PriceTable {
            rows: vec![
                PriceRow::new("AAA", d(3), 110.0),
                PriceRow::new("AAA", d(2), 100.0),
                PriceRow::new("BBB", d(2), 50.0),
                PriceRow::new("CCC", d(2), 7.0),
            ],
            symbols: vec!["AAA".into(), "BBB".into(), "CCC".into()],
            ..Default::default()
        }
    }

    fn sectors() -> SectorTable {
        SectorTable {
            entries: vec![
                SectorEntry {
                    raw_symbol: Some("NSE: AAA".into()),
                    canonical_symbol: Some("AAA".into()),
                    sector: Some("TECH".into()),
                },
                SectorEntry {
                    raw_symbol: Some("CCC".into()),
                    canonical_symbol: Some("CCC".into()),
                    sector: None,
                },
            ],
            duplicates_dropped: 0,
        }
    }

    #[test]
    fn left_join_keeps_every_row() {
        let merged = merge_sectors(&prices(), &sectors());

        assert_eq!(merged.len(), 4);
        assert_eq!(merged.rows[0].sector.as_deref(), Some("TECH"));
        assert_eq!(merged.rows[2].sector, None);
        assert_eq!(merged.unmatched_rows, 1);
        assert_eq!(merged.unmatched_symbols, vec!["BBB".to_string()]);
        // CCC matched an entry whose sector cell was empty
        assert_eq!(merged.rows_without_sector(), 2);
    }

    #[test]
    fn merge_with_no_sectors_marks_everything_unmatched() {
        let merged = merge_sectors(&prices(), &SectorTable::default());
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.unmatched_rows, 4);
        // AAA has two rows but is listed once, in first-seen order
        assert_eq!(merged.unmatched_symbols, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn series_are_grouped_and_date_ordered() {
        let merged = merge_sectors(&prices(), &sectors());
        let series = merged.series();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].symbol, "AAA");
        assert_eq!(series[0].closes(), vec![100.0, 110.0]);
        assert_eq!(series[0].sector.as_deref(), Some("TECH"));
        assert_eq!(series[1].symbol, "BBB");
        assert_eq!(series[1].sector, None);
    }

    #[test]
    fn series_skip_symbols_without_rows() {
        let mut p = prices();
        p.symbols.insert(0, "EMPTY".into());
        let merged = merge_sectors(&p, &sectors());
        let symbols: Vec<_> = merged.series().into_iter().map(|s| s.symbol).collect();
        assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn dataset_hash_tracks_content() {
        let a = merge_sectors(&prices(), &sectors());
        let b = merge_sectors(&prices(), &sectors());
        assert_eq!(a.dataset_hash(), b.dataset_hash());

        let c = merge_sectors(&prices(), &SectorTable::default());
        assert_ne!(a.dataset_hash(), c.dataset_hash());
    }
}
