//! Durable single-file JSON cache of upload and registration progress.
//!
//! The document is read fully into memory at process start and rewritten
//! wholesale after every state-changing step, so a crash loses at most the
//! in-flight network operation, never committed progress.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::types::{CacheDocument, CacheRecord};

pub struct CacheStore {
    path: PathBuf,
    pub doc: CacheDocument,
}

impl CacheStore {
    /// Load the cache from `path`. A missing file yields an empty document,
    /// never an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("cache file {} is not valid JSON", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheDocument::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading cache file {}", path.display()))
            }
        };
        Ok(Self { path, doc })
    }

    /// Full-file overwrite. Called after every state-changing operation,
    /// including inside failure-handling paths.
    pub fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.doc)?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("writing cache file {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn record(&self, index: &str) -> Option<&CacheRecord> {
        self.doc.items.get(index)
    }

    /// Record a successful upload for `index`. Does not persist; callers
    /// flush with [`CacheStore::save`] before the next network call.
    pub fn set_uploaded(&mut self, index: &str, link: String, name: String) {
        let entry = self.doc.items.entry(index.to_string()).or_default();
        entry.link = Some(link);
        entry.name = name;
    }

    pub fn mark_registered(&mut self, index: &str) {
        if let Some(entry) = self.doc.items.get_mut(index) {
            entry.on_ledger = true;
        }
    }

    pub fn clear_registered(&mut self, index: &str) {
        if let Some(entry) = self.doc.items.get_mut(index) {
            entry.on_ledger = false;
        }
    }

    /// All cached item indices in ascending numeric order.
    pub fn ordered_indices(&self) -> Vec<String> {
        let mut indices: Vec<String> = self.doc.items.keys().cloned().collect();
        indices.sort_by(|a, b| crate::assets::index_order(a, b));
        indices
    }
}
