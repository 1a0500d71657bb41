//! Export of a pipeline run: CSV tables, a JSON metrics bundle, and a
//! Parquet copy of the merged dataset.
//!
//! Non-finite values are written as empty CSV cells and as JSON `null`.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use stockdash_core::metrics::{CorrelationMatrix, SectorAverage, VolatilityEntry, YearlyReturn};
use stockdash_core::{MergedTable, Metrics, PipelineOutput};
use tracing::info;

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: symbol, return_pct
pub fn export_yearly_csv(returns: &[YearlyReturn]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["symbol", "return_pct"])?;
    for r in returns {
        wtr.write_record([r.symbol.as_str(), fmt_cell(r.return_pct).as_str()])?;
    }
    finish(wtr)
}

/// Columns: symbol, volatility
pub fn export_volatility_csv(entries: &[VolatilityEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["symbol", "volatility"])?;
    for v in entries {
        wtr.write_record([v.symbol.as_str(), fmt_cell(v.volatility).as_str()])?;
    }
    finish(wtr)
}

/// Columns: sector, avg_return_pct
pub fn export_sectors_csv(sectors: &[SectorAverage]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["sector", "avg_return_pct"])?;
    for s in sectors {
        wtr.write_record([s.sector.as_str(), fmt_cell(s.avg_return_pct).as_str()])?;
    }
    finish(wtr)
}

/// Square matrix with a leading `symbol` column.
pub fn export_correlation_csv(matrix: &CorrelationMatrix) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["symbol".to_string()];
    header.extend(matrix.symbols.iter().cloned());
    wtr.write_record(&header)?;

    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        let mut record = vec![symbol.clone()];
        record.extend(row.iter().map(|v| fmt_cell(*v)));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn fmt_cell(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.6}")
    } else {
        String::new()
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize the whole metrics bundle to pretty JSON.
pub fn export_metrics_json(metrics: &Metrics) -> Result<String> {
    serde_json::to_string_pretty(metrics).context("failed to serialize metrics to JSON")
}

// ─── Parquet export ─────────────────────────────────────────────────

/// Write the merged dataset to `path` as Parquet.
///
/// Columns: symbol, date (ISO text), open, high, low, close, volume, sector.
pub fn export_merged_parquet(path: &Path, merged: &MergedTable) -> Result<()> {
    let rows = &merged.rows;
    let symbols: Vec<&str> = rows.iter().map(|r| r.price.symbol.as_str()).collect();
    let dates: Vec<String> = rows.iter().map(|r| r.price.date.to_string()).collect();
    let open: Vec<Option<f64>> = rows.iter().map(|r| r.price.open).collect();
    let high: Vec<Option<f64>> = rows.iter().map(|r| r.price.high).collect();
    let low: Vec<Option<f64>> = rows.iter().map(|r| r.price.low).collect();
    let close: Vec<f64> = rows.iter().map(|r| r.price.close).collect();
    let volume: Vec<Option<u64>> = rows.iter().map(|r| r.price.volume).collect();
    let sector: Vec<Option<&str>> = rows.iter().map(|r| r.sector.as_deref()).collect();

    let mut df = DataFrame::new(vec![
        Column::Series(Series::new("symbol".into(), symbols).into()),
        Column::Series(Series::new("date".into(), dates).into()),
        Column::Series(Series::new("open".into(), open).into()),
        Column::Series(Series::new("high".into(), high).into()),
        Column::Series(Series::new("low".into(), low).into()),
        Column::Series(Series::new("close".into(), close).into()),
        Column::Series(Series::new("volume".into(), volume).into()),
        Column::Series(Series::new("sector".into(), sector).into()),
    ])
    .context("failed to build merged dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create parquet file {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("failed to write merged parquet")?;
    Ok(())
}

// ─── Export bundle ──────────────────────────────────────────────────

/// Save every export of a run under `output_dir`.
///
/// Creates a directory named after the dataset hash containing:
/// - `metrics.json`: the full `Metrics` bundle
/// - `yearly_returns.csv`, `volatility.csv`, `sector_averages.csv`,
///   `correlation.csv`
/// - `merged.parquet`: the merged dataset
///
/// Returns the path to the created directory.
pub fn save_exports(output: &PipelineOutput, output_dir: &Path) -> Result<PathBuf> {
    let hex = output.dataset_hash.to_hex();
    let run_dir = output_dir.join(&hex[..16]);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create export dir: {}", run_dir.display()))?;

    let metrics = &output.metrics;
    let files = [
        ("metrics.json", export_metrics_json(metrics)?),
        ("yearly_returns.csv", export_yearly_csv(&metrics.yearly_returns)?),
        ("volatility.csv", export_volatility_csv(&metrics.volatility)?),
        ("sector_averages.csv", export_sectors_csv(&metrics.sector_averages)?),
        ("correlation.csv", export_correlation_csv(&metrics.correlation)?),
    ];
    for (name, content) in &files {
        let path = run_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    export_merged_parquet(&run_dir.join("merged.parquet"), &output.merged)?;

    info!(dir = %run_dir.display(), "saved exports");
    Ok(run_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_csv_has_header_and_rows() {
        let csv = export_yearly_csv(&[
            YearlyReturn {
                symbol: "AAA".into(),
                return_pct: 21.0,
            },
            YearlyReturn {
                symbol: "BBB".into(),
                return_pct: f64::NAN,
            },
        ])
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "symbol,return_pct");
        assert_eq!(lines[1], "AAA,21.000000");
        assert_eq!(lines[2], "BBB,");
    }

    #[test]
    fn correlation_csv_is_square() {
        let matrix = CorrelationMatrix {
            symbols: vec!["A".into(), "B".into()],
            values: vec![vec![1.0, -0.5], vec![-0.5, f64::NAN]],
        };
        let csv = export_correlation_csv(&matrix).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "symbol,A,B");
        assert_eq!(lines[1], "A,1.000000,-0.500000");
        assert_eq!(lines[2], "B,-0.500000,");
    }

    #[test]
    fn sector_names_with_commas_are_quoted() {
        let csv = export_sectors_csv(&[SectorAverage {
            sector: "Oil, Gas".into(),
            avg_return_pct: 1.5,
        }])
        .unwrap();
        assert!(csv.contains("\"Oil, Gas\",1.500000"));
    }
}
