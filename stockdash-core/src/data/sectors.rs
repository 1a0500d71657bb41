//! Sector lookup loader.
//!
//! The sector sheet lists symbols in a display form such as `NSE: TCS`.
//! The text after the first `": "` is the canonical symbol used to join
//! against price files; entries are unique by canonical symbol.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{SectorEntry, SectorTable};

/// Separator between an exchange prefix and the ticker.
pub const SYMBOL_SEPARATOR: &str = ": ";

/// Errors from loading the sector reference file.
#[derive(Debug, Error)]
pub enum SectorError {
    #[error("sector data file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to open sector file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in sector file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{column}' column missing in sector file {}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Strip a decorative exchange prefix from a symbol.
///
/// `Some("NSE: TCS")` → `Some("TCS")`; a value without the separator is
/// returned unchanged, and an empty cell (`None`) stays `None`.
pub fn canonical_symbol(raw: Option<&str>) -> Option<&str> {
    raw.map(|s| {
        s.split_once(SYMBOL_SEPARATOR)
            .map_or(s, |(_, ticker)| ticker)
    })
}

/// Load and deduplicate the sector reference file.
pub fn load_sectors(path: &Path) -> Result<SectorTable, SectorError> {
    if !path.is_file() {
        return Err(SectorError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let handle = File::open(path).map_err(|source| SectorError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_sectors(path, handle)?;

    if table.duplicates_dropped > 0 {
        debug!(
            dropped = table.duplicates_dropped,
            "dropped duplicate sector entries"
        );
    }
    info!(entries = table.len(), "loaded sector data");
    Ok(table)
}

/// Parse sector rows from any reader. `path` is only used in error messages.
pub fn parse_sectors<R: Read>(path: &Path, reader: R) -> Result<SectorTable, SectorError> {
    let csv_err = |source: csv::Error| SectorError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?;
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SectorError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let symbol_col = column("Symbol")?;
    let sector_col = column("sector")?;

    let mut table = SectorTable::default();
    let mut seen: HashSet<Option<String>> = HashSet::new();

    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let raw_symbol = non_empty(record.get(symbol_col));
        let canonical = canonical_symbol(raw_symbol.as_deref()).map(str::to_owned);

        if !seen.insert(canonical.clone()) {
            table.duplicates_dropped += 1;
            continue;
        }
        table.entries.push(SectorEntry {
            sector: non_empty(record.get(sector_col)),
            raw_symbol,
            canonical_symbol: canonical,
        });
    }

    Ok(table)
}

fn non_empty(cell: Option<&str>) -> Option<String> {
    cell.filter(|s| !s.is_empty()).map(str::to_owned)
}
