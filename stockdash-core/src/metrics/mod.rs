//! Derived metrics: pure functions of the merged dataset.
//!
//! Every table here is a deterministic function of the [`MergedTable`] (and
//! the top-N length): the same input always yields the same output.

pub mod correlation;
pub mod returns;
pub mod sector;
pub mod stats;
pub mod volatility;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::MergedTable;

pub use correlation::{ClosePivot, CorrelationMatrix};
pub use returns::{
    pct_change, period_return_pct, top_green, top_red, yearly_returns, DailyReturns, YearlyReturn,
};
pub use sector::{sector_averages, SectorAverage};
pub use volatility::{top_volatile, volatility, VolatilityEntry};

/// Length of the top/bottom rankings.
pub const DEFAULT_TOP_N: usize = 10;

/// Every derived table of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub top_n: usize,
    /// One entry per symbol with rows, in discovery order.
    pub daily_returns: Vec<DailyReturns>,
    /// Symbols with at least 2 rows, in discovery order.
    pub yearly_returns: Vec<YearlyReturn>,
    pub top_green: Vec<YearlyReturn>,
    pub top_red: Vec<YearlyReturn>,
    pub volatility: Vec<VolatilityEntry>,
    pub top_volatile: Vec<VolatilityEntry>,
    pub sector_averages: Vec<SectorAverage>,
    pub correlation: CorrelationMatrix,
}

impl Metrics {
    /// Compute all metrics from the merged dataset.
    pub fn derive(merged: &MergedTable, top_n: usize) -> Self {
        let series = merged.series();

        let daily_returns: Vec<DailyReturns> =
            series.iter().map(DailyReturns::from_series).collect();
        let yearly = yearly_returns(&series);
        let vol = volatility(&daily_returns);

        let sectors: HashMap<String, Option<String>> = series
            .iter()
            .map(|s| (s.symbol.clone(), s.sector.clone()))
            .collect();

        debug!(
            symbols = series.len(),
            with_return = yearly.len(),
            "derived metrics"
        );

        Self {
            top_n,
            top_green: top_green(&yearly, top_n),
            top_red: top_red(&yearly, top_n),
            top_volatile: top_volatile(&vol, top_n),
            sector_averages: sector_averages(&yearly, &sectors),
            correlation: CorrelationMatrix::from_series(&series),
            daily_returns,
            yearly_returns: yearly,
            volatility: vol,
        }
    }

    pub fn daily_returns_of(&self, symbol: &str) -> Option<&DailyReturns> {
        self.daily_returns.iter().find(|d| d.symbol == symbol)
    }

    pub fn yearly_return_of(&self, symbol: &str) -> Option<f64> {
        self.yearly_returns
            .iter()
            .find(|y| y.symbol == symbol)
            .map(|y| y.return_pct)
    }

    pub fn volatility_of(&self, symbol: &str) -> Option<f64> {
        self.volatility
            .iter()
            .find(|v| v.symbol == symbol)
            .map(|v| v.volatility)
    }
}
