//! `amdeps.toml` loading.
//!
//! ```toml
//! keyword = "require.def"
//! session_dir = ".amdeps"
//! reindex_on_save = true
//!
//! [[project]]
//! id = "projA"
//! path = "../projA"
//! source_root = "script"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.
//! Without a config file (or without `[[project]]` entries) the workspace
//! itself is the only project, named after its directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use amdeps_core::error::{AmdepsError, AmdepsResult};
use amdeps_core::index::{ProjectRoot, DEFAULT_SOURCE_ROOT};
use amdeps_core::locator::DEFAULT_KEYWORD;

/// Config file name looked up in the workspace root.
pub const CONFIG_FILE: &str = "amdeps.toml";

/// Default session directory, relative to the workspace.
pub const DEFAULT_SESSION_DIR: &str = ".amdeps";

/// Project id used when the workspace path has no final component.
const FALLBACK_PROJECT_ID: &str = "workspace";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    keyword: Option<String>,
    session_dir: Option<PathBuf>,
    reindex_on_save: Option<bool>,
    #[serde(default, rename = "project")]
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectEntry {
    id: String,
    path: PathBuf,
    source_root: Option<String>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Workspace root.
    pub workspace: PathBuf,
    /// Dependency-declaration keyword.
    pub keyword: String,
    /// Directory holding the stored index.
    pub session_dir: PathBuf,
    /// Rebuild the index after every written file.
    pub reindex_on_save: bool,
    /// Projects to index, in order.
    pub projects: Vec<ProjectRoot>,
}

fn config_error(path: &Path, message: impl std::fmt::Display) -> AmdepsError {
    AmdepsError::Config {
        message: format!("{}: {}", path.display(), message),
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl Config {
    /// Configuration used when no config file exists.
    pub fn defaults(workspace: &Path) -> Self {
        let id = workspace
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_PROJECT_ID.to_string());
        Config {
            workspace: workspace.to_path_buf(),
            keyword: DEFAULT_KEYWORD.to_string(),
            session_dir: workspace.join(DEFAULT_SESSION_DIR),
            reindex_on_save: true,
            projects: vec![ProjectRoot::new(id, workspace)],
        }
    }

    /// Load `explicit`, or `<workspace>/amdeps.toml` when present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(workspace: &Path, explicit: Option<&Path>) -> AmdepsResult<Self> {
        let path = match explicit {
            Some(path) => resolve(workspace, path),
            None => workspace.join(CONFIG_FILE),
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
                debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Config::defaults(workspace));
            }
            Err(e) => return Err(config_error(&path, e)),
        };
        let base = path.parent().unwrap_or(workspace);
        Config::parse(workspace, base, &text).map_err(|e| match e {
            AmdepsError::Config { message } => config_error(&path, message),
            other => other,
        })
    }

    /// Parse config text; relative paths resolve against `base`.
    pub fn parse(workspace: &Path, base: &Path, text: &str) -> AmdepsResult<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| AmdepsError::Config {
            message: e.to_string(),
        })?;

        let mut config = Config::defaults(workspace);
        if let Some(keyword) = file.keyword {
            config.keyword = keyword;
        }
        if let Some(session_dir) = file.session_dir {
            config.session_dir = resolve(base, &session_dir);
        }
        if let Some(reindex) = file.reindex_on_save {
            config.reindex_on_save = reindex;
        }

        if !file.projects.is_empty() {
            config.projects = file
                .projects
                .into_iter()
                .map(|entry| {
                    if entry.id.trim().is_empty() {
                        return Err(AmdepsError::Config {
                            message: "project id must not be empty".to_string(),
                        });
                    }
                    let source_root = entry
                        .source_root
                        .unwrap_or_else(|| DEFAULT_SOURCE_ROOT.to_string());
                    Ok(ProjectRoot::new(entry.id, resolve(base, &entry.path))
                        .with_source_root(source_root))
                })
                .collect::<AmdepsResult<_>>()?;
        }
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
