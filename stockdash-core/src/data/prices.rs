//! Symbol price loader.
//!
//! Reads every `*.{ext}` file of a directory as the price history of one
//! symbol (the file stem), concatenates them in discovery order and drops
//! repeated (symbol, date) rows, keeping the first.
//!
//! A bad file does not stop discovery: every file is opened, read and closed
//! in turn, and all failures are reported together once enumeration is done.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::dates::DateParser;
use crate::domain::{LoadSummary, PriceRow, PriceTable};

/// Errors from loading the price directory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("price data directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("failed to list price directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open price file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in price file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("price file {} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("price file {}: none of its {rows} rows has a parseable date", path.display())]
    NoParseableDates { path: PathBuf, rows: usize },

    #[error("{} price files failed to load:\n{}", .0.len(), list_errors(.0))]
    InvalidFiles(Vec<LoadError>),
}

fn list_errors(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A price file found in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFile {
    pub symbol: String,
    pub path: PathBuf,
}

/// Rows parsed from one price file, before deduplication.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub rows: Vec<PriceRow>,
    pub rows_read: usize,
    pub bad_date_rows: usize,
    pub bad_close_rows: usize,
}

/// Loads per-symbol price files from a directory.
#[derive(Debug, Clone)]
pub struct PriceLoader {
    extension: String,
    dates: DateParser,
}

impl PriceLoader {
    /// `extension` is given without the leading dot (e.g. `"csv"`).
    pub fn new(extension: impl Into<String>, dates: DateParser) -> Self {
        Self {
            extension: extension.into(),
            dates,
        }
    }

    /// List the price files of `dir`, sorted by file name.
    ///
    /// Only regular files whose name ends in `.{extension}` count; the
    /// symbol is the name with that suffix removed.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PriceFile>, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }

        let read_dir_err = |source: std::io::Error| LoadError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        let suffix = format!(".{}", self.extension);
        let mut files = Vec::new();

        for entry in fs::read_dir(dir).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %path.display(), "skipping price file with non UTF-8 name");
                continue;
            };
            match name.strip_suffix(&suffix) {
                Some(symbol) if !symbol.is_empty() => files.push(PriceFile {
                    symbol: symbol.to_string(),
                    path,
                }),
                _ => debug!(file = %name, "ignoring non-price file"),
            }
        }

        files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(files)
    }

    /// Load every price file of `dir` into one deduplicated table.
    pub fn load_dir(&self, dir: &Path) -> Result<PriceTable, LoadError> {
        let files = self.discover(dir)?;

        let mut table = PriceTable::default();
        let mut failures = Vec::new();

        for file in &files {
            match self.parse_file(file) {
                Ok(parsed) => {
                    table.summary.files_read += 1;
                    table.summary.rows_read += parsed.rows_read;
                    table.summary.bad_date_rows += parsed.bad_date_rows;
                    table.summary.bad_close_rows += parsed.bad_close_rows;
                    table.rows.extend(parsed.rows);
                    table.symbols.push(file.symbol.clone());
                }
                Err(e) => failures.push(e),
            }
        }

        match failures.len() {
            0 => {}
            1 => return Err(failures.remove(0)),
            _ => return Err(LoadError::InvalidFiles(failures)),
        }

        table.summary.duplicates_dropped = dedupe_rows(&mut table.rows);

        if files.is_empty() {
            debug!(dir = %dir.display(), ext = %self.extension, "no price files found");
        }
        if table.summary.duplicates_dropped > 0 {
            debug!(
                dropped = table.summary.duplicates_dropped,
                "dropped duplicate (symbol, date) price rows"
            );
        }
        info!(
            symbols = table.symbols.len(),
            rows = table.rows.len(),
            "loaded price data"
        );

        Ok(table)
    }

    /// Open and parse one price file. The handle is closed on return.
    pub fn parse_file(&self, file: &PriceFile) -> Result<ParsedFile, LoadError> {
        let handle = File::open(&file.path).map_err(|source| LoadError::Open {
            path: file.path.clone(),
            source,
        })?;
        self.parse_reader(&file.symbol, &file.path, handle)
    }

    /// Parse CSV price rows from any reader, tagging each row with `symbol`.
    ///
    /// `path` is only used in error messages.
    pub fn parse_reader<R: Read>(
        &self,
        symbol: &str,
        path: &Path,
        reader: R,
    ) -> Result<ParsedFile, LoadError> {
        let csv_err = |source: csv::Error| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = Columns::locate(rdr.headers().map_err(csv_err)?, path)?;
        let mut parsed = ParsedFile::default();

        for record in rdr.records() {
            let record = record.map_err(csv_err)?;
            parsed.rows_read += 1;

            let Some(date) = record.get(columns.date).and_then(|s| self.dates.parse(s)) else {
                parsed.bad_date_rows += 1;
                continue;
            };
            let Some(close) = record.get(columns.close).and_then(parse_price) else {
                parsed.bad_close_rows += 1;
                continue;
            };

            parsed.rows.push(PriceRow {
                symbol: symbol.to_string(),
                date,
                open: columns.open.and_then(|i| record.get(i)).and_then(parse_price),
                high: columns.high.and_then(|i| record.get(i)).and_then(parse_price),
                low: columns.low.and_then(|i| record.get(i)).and_then(parse_price),
                close,
                volume: columns.volume.and_then(|i| record.get(i)).and_then(parse_volume),
            });
        }

        if parsed.rows_read > 0 && parsed.bad_date_rows == parsed.rows_read {
            return Err(LoadError::NoParseableDates {
                path: path.to_path_buf(),
                rows: parsed.rows_read,
            });
        }
        if parsed.bad_date_rows > 0 || parsed.bad_close_rows > 0 {
            warn!(
                symbol,
                bad_dates = parsed.bad_date_rows,
                bad_closes = parsed.bad_close_rows,
                "skipped unparseable price rows"
            );
        }

        Ok(parsed)
    }
}

/// Column positions of a price file header.
struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, path: &Path) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |column: &'static str| {
            find(column).ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
        };

        Ok(Self {
            date: require("Date")?,
            close: require("Close")?,
            open: find("Open"),
            high: find("High"),
            low: find("Low"),
            volume: find("Volume"),
        })
    }
}

/// Parse a finite price. Empty cells, `NaN` and infinities are rejected.
fn parse_price(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a volume, accepting integral float text such as `1200.0`.
fn parse_volume(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
    })
}

/// Drop repeated (symbol, date) rows in place, keeping the first occurrence.
///
/// Returns the number of rows dropped.
pub fn dedupe_rows(rows: &mut Vec<PriceRow>) -> usize {
    let before = rows.len();
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::with_capacity(before);
    rows.retain(|r| seen.insert((r.symbol.clone(), r.date)));
    before - rows.len()
}
