//! Markdown dashboard generator.

use std::fmt::Write as _;

use stockdash_core::metrics::{SectorAverage, VolatilityEntry, YearlyReturn};
use stockdash_core::PipelineOutput;

/// Rows shown in the dataset preview.
pub const PREVIEW_ROWS: usize = 5;

/// Renders one pipeline run as a Markdown document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReport;

impl MarkdownReport {
    pub fn generate(&self, output: &PipelineOutput) -> String {
        let metrics = &output.metrics;
        let summary = &output.prices.summary;
        let mut report = format!(
            "# Stock Dashboard\n\n\
Dataset: `{}`\n\n\
## Summary\n\
- Symbols: {}\n\
- Price files read: {}\n\
- Rows: {}\n\
- Sector entries: {}\n",
            output.dataset_hash,
            output.merged.symbols.len(),
            summary.files_read,
            output.merged.len(),
            output.sectors.len(),
        );

        // Preview
        report.push_str("\n## Preview\n\n");
        if output.merged.is_empty() {
            report.push_str("_No price data._\n");
        } else {
            report.push_str("| Symbol | Date | Open | High | Low | Close | Volume | Sector |\n");
            report.push_str("|--------|------|------|------|-----|-------|--------|--------|\n");
            for row in output.merged.head(PREVIEW_ROWS) {
                let p = &row.price;
                let _ = writeln!(
                    report,
                    "| {} | {} | {} | {} | {} | {:.2} | {} | {} |",
                    p.symbol,
                    p.date,
                    opt_price(p.open),
                    opt_price(p.high),
                    opt_price(p.low),
                    p.close,
                    p.volume.map_or_else(|| "-".to_string(), |v| v.to_string()),
                    row.sector.as_deref().unwrap_or("-"),
                );
            }
        }

        let warnings = output.warnings();
        if !warnings.is_empty() {
            report.push_str("\n## Data Warnings\n\n");
            for warning in &warnings {
                let _ = writeln!(report, "- {warning}");
            }
        }

        let n = metrics.top_n;
        report.push_str(&format!("\n## Top {n} Green Stocks\n\n"));
        push_returns(&mut report, &metrics.top_green);

        report.push_str(&format!("\n## Top {n} Red Stocks\n\n"));
        push_returns(&mut report, &metrics.top_red);

        report.push_str(&format!("\n## Top {n} Most Volatile Stocks\n\n"));
        push_volatility(&mut report, &metrics.top_volatile);

        report.push_str("\n## Sector Performance\n\n");
        push_sectors(&mut report, &metrics.sector_averages);

        report.push_str("\n## Correlation of Daily Returns\n\n");
        let corr = &metrics.correlation;
        if corr.is_empty() {
            report.push_str("_No symbols._\n");
        } else {
            report.push_str("| |");
            for s in &corr.symbols {
                let _ = write!(report, " {s} |");
            }
            report.push_str("\n|---|");
            report.push_str(&"---|".repeat(corr.len()));
            report.push('\n');
            for (symbol, row) in corr.symbols.iter().zip(&corr.values) {
                let _ = write!(report, "| **{symbol}** |");
                for v in row {
                    let _ = write!(report, " {} |", fmt_num(*v, 2));
                }
                report.push('\n');
            }
        }

        report
    }
}

fn push_returns(report: &mut String, rows: &[YearlyReturn]) {
    if rows.is_empty() {
        report.push_str("_No symbols with at least two rows._\n");
        return;
    }
    report.push_str("| Symbol | Return |\n");
    report.push_str("|--------|--------|\n");
    for r in rows {
        let _ = writeln!(report, "| {} | {} |", r.symbol, fmt_pct(r.return_pct));
    }
}

fn push_volatility(report: &mut String, rows: &[VolatilityEntry]) {
    if rows.is_empty() {
        report.push_str("_No symbols._\n");
        return;
    }
    report.push_str("| Symbol | Volatility |\n");
    report.push_str("|--------|------------|\n");
    for v in rows {
        let _ = writeln!(report, "| {} | {} |", v.symbol, fmt_num(v.volatility, 4));
    }
}

fn push_sectors(report: &mut String, rows: &[SectorAverage]) {
    if rows.is_empty() {
        report.push_str("_No sector data._\n");
        return;
    }
    report.push_str("| Sector | Avg Return |\n");
    report.push_str("|--------|------------|\n");
    for s in rows {
        let _ = writeln!(report, "| {} | {} |", s.sector, fmt_pct(s.avg_return_pct));
    }
}

fn opt_price(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn fmt_num(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{v:.decimals$}")
    }
}

fn fmt_pct(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{v:+.2}%")
    }
}
