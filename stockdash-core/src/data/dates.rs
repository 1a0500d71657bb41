//! Date-column parsing.
//!
//! Price files come from several exporters, so the `Date` column may hold a
//! plain date, an RFC 3339 timestamp, or a `YYYY-MM-DD HH:MM:SS+HH:MM`
//! timestamp. The time component is always discarded: a row's date is the
//! calendar date as written in the file.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses the `Date` column of a price file.
#[derive(Debug, Clone, Default)]
pub struct DateParser {
    /// Additional chrono formats tried after the built-in ones.
    extra_formats: Vec<String>,
}

impl DateParser {
    pub fn new(extra_formats: Vec<String>) -> Self {
        Self { extra_formats }
    }

    /// Parse a raw cell into a calendar date. Returns `None` if no format matches.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.date_naive());
        }
        if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Some(ts.date_naive());
        }
        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(ts.date());
            }
        }

        self.extra_formats.iter().find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(s, fmt).ok().map(|ts| ts.date()))
        })
    }
}
