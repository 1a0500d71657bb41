//! Average whole-period return per sector.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::returns::YearlyReturn;
use super::stats::{cmp_nan_last, mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAverage {
    pub sector: String,
    pub avg_return_pct: f64,
}

/// Mean `return_pct` per sector, highest first.
///
/// `sectors` maps symbol → sector; symbols absent from it, or mapped to
/// `None`, are left out. Ties keep alphabetical sector order.
pub fn sector_averages(
    returns: &[YearlyReturn],
    sectors: &HashMap<String, Option<String>>,
) -> Vec<SectorAverage> {
    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in returns {
        if let Some(Some(sector)) = sectors.get(&r.symbol) {
            grouped.entry(sector.as_str()).or_default().push(r.return_pct);
        }
    }

    let mut averages: Vec<SectorAverage> = grouped
        .into_iter()
        .map(|(sector, values)| SectorAverage {
            sector: sector.to_string(),
            avg_return_pct: mean(&values),
        })
        .collect();
    averages.sort_by(|a, b| cmp_nan_last(a.avg_return_pct, b.avg_return_pct, true));
    averages
}
