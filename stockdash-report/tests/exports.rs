//! Integration tests: run the pipeline over temp fixtures, render the
//! Markdown dashboard, and write the export bundle.

use std::path::Path;

use polars::prelude::*;
use stockdash_core::{Pipeline, PipelineOutput, ReportConfig};
use stockdash_report::{save_exports, MarkdownReport};

const AAA: &str = "Date,Open,High,Low,Close,Volume\n\
2024-01-01,99,101,98,100,1000\n\
2024-01-02,100,111,99,110,1100\n\
2024-01-03,110,122,109,121,1200\n";

const BBB: &str = "Date,Close\n2024-01-01,50\n2024-01-02,45\n2024-01-03,40.5\n";

const SECTORS: &str = "Symbol,sector\nNSE: AAA,TECH\n";

fn run(root: &Path) -> PipelineOutput {
    let prices = root.join("stock_data_csvs");
    std::fs::create_dir_all(&prices).unwrap();
    std::fs::write(prices.join("AAA.csv"), AAA).unwrap();
    std::fs::write(prices.join("BBB.csv"), BBB).unwrap();
    let sectors = root.join("sectors.csv");
    std::fs::write(&sectors, SECTORS).unwrap();

    let config = ReportConfig {
        price_dir: prices,
        sector_file: sectors,
        ..ReportConfig::default()
    };
    Pipeline::new(config).unwrap().run().unwrap()
}

#[test]
fn markdown_report_has_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path());
    let report = MarkdownReport.generate(&output);

    for heading in [
        "# Stock Dashboard",
        "## Preview",
        "## Data Warnings",
        "## Top 10 Green Stocks",
        "## Top 10 Red Stocks",
        "## Top 10 Most Volatile Stocks",
        "## Sector Performance",
        "## Correlation of Daily Returns",
    ] {
        assert!(report.contains(heading), "missing {heading}");
    }
    assert!(report.contains("some stocks missing sector info"));
    assert!(report.contains("| AAA | +21.00% |"));
    assert!(report.contains("| BBB | -19.00% |"));
    assert!(report.contains("| TECH | +21.00% |"));
    // Constant returns have no defined correlation
    assert!(report.contains("| **AAA** | n/a | n/a |"));

    // Preview holds the first 5 merged rows
    let preview = report
        .split("## Preview")
        .nth(1)
        .and_then(|s| s.split("\n## ").next())
        .unwrap();
    let data_rows = preview.lines().filter(|l| l.starts_with("| AAA") || l.starts_with("| BBB")).count();
    assert_eq!(data_rows, 5);
}

#[test]
fn export_bundle_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path());
    let out_dir = dir.path().join("exports");

    let run_dir = save_exports(&output, &out_dir).unwrap();

    for name in [
        "metrics.json",
        "yearly_returns.csv",
        "volatility.csv",
        "sector_averages.csv",
        "correlation.csv",
        "merged.parquet",
    ] {
        assert!(run_dir.join(name).is_file(), "missing {name}");
    }

    let yearly = std::fs::read_to_string(run_dir.join("yearly_returns.csv")).unwrap();
    assert!(yearly.starts_with("symbol,return_pct\n"));
    assert_eq!(yearly.lines().count(), 3);
}

#[test]
fn metrics_json_writes_nan_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path());
    let run_dir = save_exports(&output, &dir.path().join("exports")).unwrap();

    let json = std::fs::read_to_string(run_dir.join("metrics.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["top_n"], 10);
    assert!(value["correlation"]["values"][0][1].is_null());
    assert_eq!(value["daily_returns"][0]["returns"][0], serde_json::Value::Null);
}

#[test]
fn merged_parquet_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path());
    let run_dir = save_exports(&output, &dir.path().join("exports")).unwrap();

    let file = std::fs::File::open(run_dir.join("merged.parquet")).unwrap();
    let df = ParquetReader::new(file).finish().unwrap();

    assert_eq!(df.height(), output.merged.len());
    for column in ["symbol", "date", "open", "high", "low", "close", "volume", "sector"] {
        assert!(df.column(column).is_ok(), "missing column {column}");
    }
    assert_eq!(df.column("sector").unwrap().null_count(), 3);
}

#[test]
fn exports_are_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let first = save_exports(&run(dir.path()), &dir.path().join("exports")).unwrap();
    let second = save_exports(&run(dir.path()), &dir.path().join("exports")).unwrap();

    assert_eq!(first, second);
}
