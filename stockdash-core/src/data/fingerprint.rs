//! BLAKE3 content hashes of pipeline inputs.
//!
//! Every hash is seeded with a stage tag so that identical bytes fed to
//! different stages never share a memo key.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A file that could not be read while fingerprinting.
#[derive(Debug, Error)]
#[error("failed to read {} for fingerprinting: {source}", path.display())]
pub struct FingerprintError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A BLAKE3 digest used as a memo key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(blake3::Hash);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// Combine several hashes under a stage tag.
    pub fn combine(tag: &str, parts: &[ContentHash]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(tag.as_bytes());
        for part in parts {
            hasher.update(part.0.as_bytes());
        }
        Self(hasher.finalize())
    }
}

impl From<blake3::Hash> for ContentHash {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        blake3::Hash::from_hex(hex)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Hash a list of files (name and bytes, in the given order) under `tag`.
pub fn hash_files<'a>(
    tag: &str,
    files: impl IntoIterator<Item = &'a Path>,
) -> Result<ContentHash, FingerprintError> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tag.as_bytes());
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = fs::read(path).map_err(|source| FingerprintError {
            path: path.to_path_buf(),
            source,
        })?;
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(ContentHash(hasher.finalize()))
}
