//! In-memory memoization of pipeline stages.
//!
//! Each stage owns one [`Memo`] holding the result for the latest content
//! hash of that stage's input. A repeated run over unchanged inputs returns
//! the stored `Arc` instead of recomputing; a changed input replaces it.

use std::sync::Arc;

use tracing::debug;

use crate::data::ContentHash;

/// Single-entry memo for one pipeline stage.
#[derive(Debug)]
pub struct Memo<T> {
    stage: &'static str,
    entry: Option<(ContentHash, Arc<T>)>,
    hits: u64,
    misses: u64,
}

impl<T> Memo<T> {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            entry: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the stored value if it was computed for `key`; otherwise
    /// compute it and replace whatever was stored.
    ///
    /// Errors are not stored and leave the previous entry in place.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: ContentHash,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some((_, value)) = self.entry.as_ref().filter(|(k, _)| *k == key) {
            self.hits += 1;
            debug!(stage = self.stage, key = %key, "memo hit");
            return Ok(Arc::clone(value));
        }

        self.misses += 1;
        debug!(stage = self.stage, key = %key, "memo miss");
        let value = Arc::new(compute()?);
        self.entry = Some((key, Arc::clone(&value)));
        Ok(value)
    }

    pub fn contains(&self, key: &ContentHash) -> bool {
        self.entry.as_ref().is_some_and(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
