//! Content-addressable cache for analysis results.
//!
//! Keys combine a SHA-256 hash of the raw image bytes with a stable hash of
//! the canonical settings encoding, so the same (image, settings) pair never
//! pays for a second analysis call within a session. Entries live for the
//! duration of a processing session; there is no cross-session persistence.

use crate::models::{AnalysisResult, Settings};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// SHA-256 hash of raw image bytes as lowercase hex.
pub fn compute_image_hash(image_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image_bytes);
    hex::encode(hasher.finalize())
}

/// Stable hash of the canonical (order-independent) settings encoding.
///
/// The first 8 bytes (16 hex chars) are plenty for a per-session key
/// component and keep keys readable in logs.
pub fn compute_settings_hash(settings: &Settings) -> String {
    let mut hasher = Sha256::new();
    hasher.update(settings.canonical_json().as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}

/// Cache key for an (image, settings) pair.
pub fn cache_key(image_bytes: &[u8], settings: &Settings) -> String {
    format!(
        "{}_{}",
        compute_image_hash(image_bytes),
        compute_settings_hash(settings)
    )
}

/// Session-scoped associative store of analysis results.
///
/// A lookup miss is not an error; it signals the caller to invoke the
/// analysis call and `put` the validated result.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, AnalysisResult>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<AnalysisResult> {
        self.entries.get(key).cloned()
    }

    pub fn put(&mut self, key: String, result: AnalysisResult) {
        self.entries.insert(key, result);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
