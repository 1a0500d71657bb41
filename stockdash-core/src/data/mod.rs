//! Data ingestion and reconciliation

pub mod dates;
pub mod fingerprint;
pub mod merge;
pub mod prices;
pub mod sectors;

pub use dates::DateParser;
pub use fingerprint::{hash_files, ContentHash, FingerprintError};
pub use merge::{merge_sectors, MergedTable};
pub use prices::{dedupe_rows, LoadError, PriceFile, PriceLoader};
pub use sectors::{canonical_symbol, load_sectors, parse_sectors, SectorError};
