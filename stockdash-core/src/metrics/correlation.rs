//! Cross-symbol correlation of daily returns.
//!
//! Closes are pivoted onto the union of all dates (missing cells are NaN),
//! each column's returns are taken between consecutive present dates, and
//! every pair is correlated over the dates where both columns have a return.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::stats::pearson;
use crate::domain::PriceSeries;

/// Date × symbol grid of closes on a common date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosePivot {
    /// Union of all dates, ascending.
    pub dates: Vec<NaiveDate>,
    pub symbols: Vec<String>,
    /// One column per symbol, each `dates.len()` long; NaN where absent.
    pub columns: Vec<Vec<f64>>,
}

impl ClosePivot {
    pub fn from_series(series: &[PriceSeries]) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.rows.iter().map(|r| r.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let columns = series
            .iter()
            .map(|s| {
                let mut column = vec![f64::NAN; dates.len()];
                for row in &s.rows {
                    column[position[&row.date]] = row.close;
                }
                column
            })
            .collect();

        Self {
            dates,
            symbols: series.iter().map(|s| s.symbol.clone()).collect(),
            columns,
        }
    }

    /// Per-column fractional change between consecutive present cells.
    ///
    /// A cell is NaN where the close is absent or where no earlier close exists.
    pub fn returns(&self) -> Vec<Vec<f64>> {
        self.columns
            .iter()
            .map(|column| {
                let mut prev: Option<f64> = None;
                column
                    .iter()
                    .map(|&close| {
                        if close.is_nan() {
                            return f64::NAN;
                        }
                        let r = prev.map_or(f64::NAN, |p| (close - p) / p);
                        prev = Some(close);
                        r
                    })
                    .collect()
            })
            .collect()
    }
}

/// Symmetric symbol × symbol matrix of Pearson correlations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    /// Row-major, `symbols.len()` × `symbols.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Pairwise-complete correlation of daily returns.
    pub fn from_series(series: &[PriceSeries]) -> Self {
        let pivot = ClosePivot::from_series(series);
        let returns = pivot.returns();
        let n = pivot.symbols.len();
        let mut values = vec![vec![f64::NAN; n]; n];

        for i in 0..n {
            for j in i..n {
                let pairs = returns[i]
                    .iter()
                    .zip(&returns[j])
                    .filter(|(x, y)| !x.is_nan() && !y.is_nan())
                    .map(|(x, y)| (*x, *y));
                let r = pearson(pairs);
                let r = if i == j && !r.is_nan() { 1.0 } else { r };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            symbols: pivot.symbols,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Correlation of two symbols, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }
}
