//! Property tests for load, merge, and metric invariants.
//!
//! Uses proptest to verify:
//! 1. Dedup leaves (symbol, date) unique and keeps the first occurrence
//! 2. Sector tables carry no duplicate entries
//! 3. The left join never adds or drops price rows
//! 4. Correlation matrices are symmetric and bounded
//! 5. Rankings hold at most N items and are ordered

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use proptest::prelude::*;
use stockdash_core::data::{dedupe_rows, merge_sectors, parse_sectors};
use stockdash_core::domain::{PriceRow, PriceSeries, PriceTable};
use stockdash_core::metrics::{top_green, top_red, yearly_returns, CorrelationMatrix};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-E]{1,2}"
}

fn arb_close() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_row() -> impl Strategy<Value = PriceRow> {
    (arb_symbol(), 0..20u32, arb_close()).prop_map(|(symbol, day, close)| {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day.into());
        PriceRow::new(symbol, date, close)
    })
}

fn table_of(mut rows: Vec<PriceRow>) -> PriceTable {
    let duplicates_dropped = dedupe_rows(&mut rows);
    let mut symbols: Vec<String> = Vec::new();
    for row in &rows {
        if !symbols.contains(&row.symbol) {
            symbols.push(row.symbol.clone());
        }
    }
    let mut table = PriceTable {
        rows,
        symbols,
        ..PriceTable::default()
    };
    table.summary.duplicates_dropped = duplicates_dropped;
    table
}

fn series_of(table: &PriceTable) -> Vec<PriceSeries> {
    table
        .symbols
        .iter()
        .map(|s| {
            let rows = table.rows.iter().filter(|r| &r.symbol == s).cloned();
            PriceSeries::from_rows(s.clone(), None, rows)
        })
        .collect()
}

// ── 1. Dedup ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn dedup_leaves_unique_keys(rows in prop::collection::vec(arb_row(), 0..80)) {
        let original = rows.clone();
        let mut deduped = rows;
        let dropped = dedupe_rows(&mut deduped);

        prop_assert_eq!(deduped.len() + dropped, original.len());

        let keys: HashSet<_> = deduped.iter().map(|r| (r.symbol.clone(), r.date)).collect();
        prop_assert_eq!(keys.len(), deduped.len());

        // Each survivor is the first row with its key.
        for row in &deduped {
            let first = original
                .iter()
                .find(|r| r.symbol == row.symbol && r.date == row.date)
                .unwrap();
            prop_assert_eq!(first, row);
        }
    }
}

// ── 2. Sector uniqueness ─────────────────────────────────────────────

proptest! {
    #[test]
    fn sector_entries_are_unique(
        entries in prop::collection::vec((arb_symbol(), "[a-c]{0,1}"), 0..30),
    ) {
        let mut csv = String::from("Symbol,sector\n");
        for (symbol, sector) in &entries {
            csv.push_str(&format!("NSE: {symbol},{sector}\n"));
        }
        let table = parse_sectors(Path::new("sectors.csv"), csv.as_bytes()).unwrap();

        let seen: HashSet<_> = table.entries.iter().map(|e| &e.canonical_symbol).collect();
        prop_assert_eq!(seen.len(), table.entries.len());
        prop_assert_eq!(table.entries.len() + table.duplicates_dropped, entries.len());
        for entry in &table.entries {
            prop_assert!(entry.canonical_symbol.as_deref().is_some_and(|s| !s.contains(':')));
        }
    }
}

// ── 3. Merge row count ───────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_preserves_row_count(
        rows in prop::collection::vec(arb_row(), 0..60),
        sectored in prop::collection::vec(arb_symbol(), 0..6),
    ) {
        let prices = table_of(rows);
        let mut csv = String::from("Symbol,sector\n");
        for symbol in &sectored {
            csv.push_str(&format!("NSE: {symbol},S{}\n", symbol.len()));
        }
        let sectors = parse_sectors(Path::new("sectors.csv"), csv.as_bytes()).unwrap();
        let merged = merge_sectors(&prices, &sectors);

        prop_assert_eq!(merged.len(), prices.len());
        prop_assert_eq!(merged.rows_without_sector(), merged.unmatched_rows);
        for row in &merged.rows {
            prop_assert_eq!(row.sector.is_some(), sectored.contains(&row.price.symbol));
        }
    }
}

// ── 4. Correlation symmetry ──────────────────────────────────────────

proptest! {
    #[test]
    fn correlation_is_symmetric_and_bounded(rows in prop::collection::vec(arb_row(), 0..80)) {
        let table = table_of(rows);
        let matrix = CorrelationMatrix::from_series(&series_of(&table));
        let n = matrix.len();

        prop_assert_eq!(n, table.symbols.len());
        for i in 0..n {
            let diag = matrix.values[i][i];
            prop_assert!(diag.is_nan() || diag == 1.0);
            for j in 0..n {
                let (a, b) = (matrix.values[i][j], matrix.values[j][i]);
                prop_assert!(a == b || (a.is_nan() && b.is_nan()));
                prop_assert!(a.is_nan() || (-1.0..=1.0).contains(&a));
            }
        }
    }
}

// ── 5. Rankings ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rankings_are_bounded_and_ordered(
        rows in prop::collection::vec(arb_row(), 0..80),
        n in 1..12usize,
    ) {
        let table = table_of(rows);
        let yearly = yearly_returns(&series_of(&table));
        let green = top_green(&yearly, n);
        let red = top_red(&yearly, n);

        prop_assert_eq!(green.len(), yearly.len().min(n));
        prop_assert_eq!(red.len(), yearly.len().min(n));
        prop_assert!(green.windows(2).all(|w| w[0].return_pct >= w[1].return_pct));
        prop_assert!(red.windows(2).all(|w| w[0].return_pct <= w[1].return_pct));
    }
}
