//! Persisted side cache mapping numeric ids to resolved display names.
//!
//! The cache is read once at pipeline start, consulted for every id, filled
//! with whatever got resolved during the run, and written back only when
//! something new was added. A missing or corrupt file costs extra lookups,
//! never the run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::AppError;
use crate::io::snapshot;

#[derive(Debug)]
pub struct NameCache {
    path: PathBuf,
    entries: BTreeMap<u32, String>,
    dirty: bool,
}

impl NameCache {
    /// Load the cache at `path`. Missing file means a fresh cache; an
    /// unreadable one is logged and treated the same way.
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match snapshot::read_json(path) {
                Ok(map) => map,
                Err(err) => {
                    warn!("ignoring unreadable name cache: {err}");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Self {
            path: path.to_path_buf(),
            entries,
            dirty: false,
        }
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Record a resolved name and mark the cache for rewriting.
    pub fn insert(&mut self, id: u32, name: String) {
        self.entries.insert(id, name);
        self.dirty = true;
    }

    /// Write the cache back if this run added anything. Returns whether a
    /// write happened.
    pub fn save_if_dirty(&self) -> Result<bool, AppError> {
        if !self.dirty {
            return Ok(false);
        }
        snapshot::write_json(&self.path, &self.entries)?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
