//! Dependency index: class name -> candidate module locations.
//!
//! One build walks every configured project root and produces two parallel
//! indexes keyed by the lowercased file stem:
//!
//! - **module ids** (`<project-id>/<path under the source root>`, no extension),
//!   injected as dependency strings
//! - **absolute paths** (full path, no extension), used for relative injection
//!
//! A file qualifies iff it has a `.js` extension, its full path contains
//! `/<source_root>/`, it is not under a `node_modules` directory, and its stem
//! does not contain `Spec`. Candidates are appended in traversal order and
//! never deduplicated: the same class in two projects yields two candidates.
//!
//! Indexes are immutable snapshots. There is no incremental update; a new
//! build replaces the old one wholesale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{AmdepsError, AmdepsResult};

/// Default source-root marker.
pub const DEFAULT_SOURCE_ROOT: &str = "script";

/// Directory name whose contents are never indexed.
const VENDOR_DIR: &str = "node_modules";

/// Stem fragment marking test files.
const SPEC_MARKER: &str = "Spec";

// ============================================================================
// Project Roots
// ============================================================================

/// One project to index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoot {
    /// Identifier prefixed to every module id from this project.
    pub id: String,
    /// Directory to walk.
    pub path: PathBuf,
    /// Source-root marker, used verbatim as a path segment.
    pub source_root: String,
}

impl ProjectRoot {
    /// Project using the default `script` source root.
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ProjectRoot {
            id: id.into(),
            path: path.into(),
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
        }
    }

    /// Override the source-root marker.
    pub fn with_source_root(mut self, source_root: impl Into<String>) -> Self {
        self.source_root = source_root.into();
        self
    }

    fn marker(&self) -> String {
        format!("/{}/", self.source_root)
    }
}

// ============================================================================
// Dependency Index
// ============================================================================

/// Mapping from lowercased class name to its ordered candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyIndex {
    entries: BTreeMap<String, Vec<String>>,
}

impl DependencyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `candidate` under `name` (lowercased).
    pub fn insert(&mut self, name: &str, candidate: impl Into<String>) {
        self.entries
            .entry(name.to_lowercase())
            .or_default()
            .push(candidate.into());
    }

    /// Candidates for a class name, looked up case-insensitively.
    pub fn candidates(&self, class_name: &str) -> Option<&[String]> {
        self.entries
            .get(&class_name.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no names.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The pair of indexes produced by one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyIndexes {
    /// Name -> `<project-id>/<module path>`.
    pub module_ids: DependencyIndex,
    /// Name -> absolute path without extension.
    pub absolute_paths: DependencyIndex,
    /// Number of files that qualified.
    pub file_count: usize,
}

// ============================================================================
// Qualification
// ============================================================================

/// Convert a path to a forward-slash string.
fn slash_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/")
}

/// Whether the file at `path` belongs in the index for `source_root`.
pub fn qualifies(path: &Path, source_root: &str) -> bool {
    let is_js = path.extension().and_then(|e| e.to_str()) == Some("js");
    if !is_js {
        return false;
    }
    let in_source_root = slash_path(path).contains(&format!("/{}/", source_root));
    let in_vendor = path
        .components()
        .any(|c| c.as_os_str() == VENDOR_DIR);
    let is_spec = path
        .file_stem()
        .map(|s| s.to_string_lossy().contains(SPEC_MARKER))
        .unwrap_or(true);
    in_source_root && !in_vendor && !is_spec
}

/// `<full path without extension>` and `<project-id>/<path after marker>`.
fn index_entries(project: &ProjectRoot, path: &Path) -> Option<(String, String)> {
    let absolute = slash_path(&path.with_extension(""));
    let (_, relative) = absolute.split_once(&project.marker())?;
    let module_id = format!("{}/{}", project.id, relative);
    Some((absolute, module_id))
}

// ============================================================================
// Build
// ============================================================================

/// Walk every project root and build both indexes.
///
/// Roots are visited in the given order; within a root, directory entries are
/// visited sorted by file name so one build is deterministic. Any traversal
/// failure aborts the build with `AmdepsError::Filesystem`.
pub fn build_indexes(projects: &[ProjectRoot]) -> AmdepsResult<DependencyIndexes> {
    let mut indexes = DependencyIndexes::default();

    for project in projects {
        let root = project
            .path
            .canonicalize()
            .map_err(|e| AmdepsError::filesystem(&project.path, e))?;
        debug!(project = %project.id, root = %root.display(), "indexing project");

        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != VENDOR_DIR)
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                AmdepsError::filesystem(&path, e)
            })?;
            if !entry.file_type().is_file() || !qualifies(entry.path(), &project.source_root) {
                continue;
            }
            let Some((absolute, module_id)) = index_entries(project, entry.path()) else {
                continue;
            };
            let name = entry
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            debug!(name = %name, module_id = %module_id, "indexed");
            indexes.module_ids.insert(&name, module_id);
            indexes.absolute_paths.insert(&name, absolute);
            indexes.file_count += 1;
        }
    }

    info!(
        projects = projects.len(),
        files = indexes.file_count,
        names = indexes.module_ids.len(),
        "dependency index built"
    );
    Ok(indexes)
}

// ============================================================================
// Tests
// ============================================================================
