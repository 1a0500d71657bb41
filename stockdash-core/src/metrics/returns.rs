//! Daily and whole-period returns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::stats::top_n;
use crate::domain::PriceSeries;

/// Daily returns of one symbol, aligned with its date-ordered rows.
///
/// `returns[0]` is always `None`; `returns[i]` is the fractional change of
/// the close from row `i - 1` to row `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReturns {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub returns: Vec<Option<f64>>,
}

impl DailyReturns {
    pub fn from_series(series: &PriceSeries) -> Self {
        Self {
            symbol: series.symbol.clone(),
            dates: series.dates(),
            returns: pct_change(&series.closes()),
        }
    }

    /// The defined (non-null, non-NaN) returns, in date order.
    pub fn observations(&self) -> Vec<f64> {
        self.returns
            .iter()
            .flatten()
            .copied()
            .filter(|r| !r.is_nan())
            .collect()
    }
}

/// Whole observed period return of one symbol, in percent.
///
/// Despite the name this is first row to last row, not a calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReturn {
    pub symbol: String,
    pub return_pct: f64,
}

/// Fractional change between consecutive values; the first entry is `None`.
pub fn pct_change(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(closes.windows(2).map(|w| Some((w[1] - w[0]) / w[0])));
    out
}

/// `(last - first) / first * 100` over a date-ordered series.
///
/// `None` for series with fewer than 2 rows.
pub fn period_return_pct(series: &PriceSeries) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let first = series.rows.first()?.close;
    let last = series.rows.last()?.close;
    Some((last - first) / first * 100.0)
}

/// Whole-period return of every series with at least 2 rows, in input order.
pub fn yearly_returns(series: &[PriceSeries]) -> Vec<YearlyReturn> {
    series
        .iter()
        .filter_map(|s| {
            period_return_pct(s).map(|return_pct| YearlyReturn {
                symbol: s.symbol.clone(),
                return_pct,
            })
        })
        .collect()
}

/// Best `n` performers, highest return first.
pub fn top_green(returns: &[YearlyReturn], n: usize) -> Vec<YearlyReturn> {
    top_n(returns, n, true, |r| r.return_pct)
}

/// Worst `n` performers, lowest return first.
pub fn top_red(returns: &[YearlyReturn], n: usize) -> Vec<YearlyReturn> {
    top_n(returns, n, false, |r| r.return_pct)
}
