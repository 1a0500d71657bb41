//! Per-symbol volatility of daily returns.

use serde::{Deserialize, Serialize};

use super::returns::DailyReturns;
use super::stats::{sample_std, top_n};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEntry {
    pub symbol: String,
    /// Sample standard deviation of daily returns; NaN with fewer than 2 returns.
    pub volatility: f64,
}

pub fn volatility(returns: &[DailyReturns]) -> Vec<VolatilityEntry> {
    returns
        .iter()
        .map(|r| VolatilityEntry {
            symbol: r.symbol.clone(),
            volatility: sample_std(&r.observations()),
        })
        .collect()
}

/// Most volatile `n` symbols, highest first. NaN entries sort last.
pub fn top_volatile(entries: &[VolatilityEntry], n: usize) -> Vec<VolatilityEntry> {
    top_n(entries, n, true, |e| e.volatility)
}
