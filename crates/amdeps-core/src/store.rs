//! Session-scoped index store.
//!
//! Holds the most recently built [`DependencyIndexes`] between invocations,
//! in `<session_dir>/index.json`. A build that fails never reaches the store,
//! so the previous index (stale but usable) stays in place.
//!
//! Writes go through temp file + rename so readers see either the old or the
//! new index, never a partial one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AmdepsError, AmdepsResult};
use crate::index::DependencyIndexes;

/// File name of the stored index inside the session directory.
pub const INDEX_FILE: &str = "index.json";

/// Schema version of `index.json`.
const STORE_VERSION: &str = "1";

/// On-disk form of a stored index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIndex {
    /// Schema version for index.json.
    pub schema_version: String,
    /// When the index was built (RFC 3339, UTC).
    pub built_at: String,
    /// The indexes themselves.
    pub indexes: DependencyIndexes,
}

/// Write content to a file atomically using temp + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = path.with_file_name(format!(
        ".{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id()
    ));
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
}

/// Index store rooted at a session directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    session_dir: PathBuf,
}

impl IndexStore {
    /// Store using `session_dir`; the directory is created on first save.
    pub fn open(session_dir: impl Into<PathBuf>) -> Self {
        IndexStore {
            session_dir: session_dir.into(),
        }
    }

    /// Path of the stored index file.
    pub fn index_path(&self) -> PathBuf {
        self.session_dir.join(INDEX_FILE)
    }

    /// Replace the stored index with `indexes`.
    pub fn save(&self, indexes: &DependencyIndexes) -> AmdepsResult<StoredIndex> {
        fs::create_dir_all(&self.session_dir)
            .map_err(|e| AmdepsError::filesystem(&self.session_dir, e))?;

        let stored = StoredIndex {
            schema_version: STORE_VERSION.to_string(),
            built_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            indexes: indexes.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| AmdepsError::internal(format!("serialize index: {}", e)))?;

        let path = self.index_path();
        atomic_write(&path, &json).map_err(|e| AmdepsError::filesystem(&path, e))?;
        debug!(path = %path.display(), "index stored");
        Ok(stored)
    }

    /// Load the stored index, or `None` when nothing has been built yet.
    pub fn load(&self) -> AmdepsResult<Option<StoredIndex>> {
        let path = self.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AmdepsError::filesystem(&path, e)),
        };
        let stored: StoredIndex = serde_json::from_slice(&bytes).map_err(|e| {
            AmdepsError::internal(format!("index at {} is corrupt: {}", path.display(), e))
        })?;
        Ok(Some(stored))
    }

    /// Load the stored indexes, failing with `IndexUnavailable` when absent.
    pub fn require(&self) -> AmdepsResult<DependencyIndexes> {
        self.load()?
            .map(|stored| stored.indexes)
            .ok_or(AmdepsError::IndexUnavailable)
    }
}

// ============================================================================
// Tests
// ============================================================================
