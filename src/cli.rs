//! CLI front door: one `run_*` function per command.
//!
//! Each function loads the target file into a [`MemoryBuffer`], runs the
//! engine command against it, and then either renders a diff (`--dry-run`)
//! or writes the file back. Writes are guarded by the content hash taken at
//! load time, so a file edited on disk in the meantime is never clobbered.
//!
//! All functions return `Result<T, AmdepsError>`; the caller (`main.rs`)
//! turns errors into JSON error responses and exit codes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use amdeps_core::buffer::{MemoryBuffer, TextBuffer};
use amdeps_core::commands::{self, CommandReport};
use amdeps_core::diff::generate_unified_diff;
use amdeps_core::editor::{inject_at_point, inject_dependencies, InjectMode};
use amdeps_core::error::{AmdepsError, AmdepsResult};
use amdeps_core::index::{build_indexes, DependencyIndexes};
use amdeps_core::interaction::InteractionAdapter;
use amdeps_core::locator::PatternLocator;
use amdeps_core::output::{EditResponse, IndexResponse};
use amdeps_core::patch::ContentHash;
use amdeps_core::store::{atomic_write, IndexStore};
use amdeps_core::text::parse_position;

use crate::config::Config;

// ============================================================================
// Session
// ============================================================================

/// Per-invocation state shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    /// Resolved configuration.
    pub config: Config,
    /// Render a diff instead of writing files.
    pub dry_run: bool,
    /// Rebuild the index before running the command.
    pub reindex: bool,
}

impl Session {
    /// Session over `config` with default options.
    pub fn new(config: Config) -> Self {
        Session {
            config,
            dry_run: false,
            reindex: false,
        }
    }

    /// The index store for this session.
    pub fn store(&self) -> IndexStore {
        IndexStore::open(&self.config.session_dir)
    }

    fn locator(&self) -> AmdepsResult<PatternLocator> {
        PatternLocator::new(&self.config.keyword)
    }

    /// Build the index from the configured projects and store it.
    pub fn rebuild_index(&self) -> AmdepsResult<(DependencyIndexes, String)> {
        let indexes = build_indexes(&self.config.projects)?;
        let stored = self.store().save(&indexes)?;
        Ok((indexes, stored.built_at))
    }

    /// The current index: rebuilt when `--reindex` was given, else stored.
    fn indexes(&self) -> AmdepsResult<DependencyIndexes> {
        if self.reindex {
            return self.rebuild_index().map(|(indexes, _)| indexes);
        }
        self.store().require()
    }

    /// Workspace-relative display form of `path`.
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.config.workspace)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

// ============================================================================
// File Handling
// ============================================================================

/// A file loaded for editing.
struct LoadedFile {
    path: PathBuf,
    display: String,
    hash: ContentHash,
    buffer: MemoryBuffer,
}

fn load_file(session: &Session, file: &Path) -> AmdepsResult<LoadedFile> {
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        session.config.workspace.join(file)
    };
    let text = fs::read_to_string(&path).map_err(|e| AmdepsError::filesystem(&path, e))?;
    let display = session.display_path(&path);
    Ok(LoadedFile {
        hash: ContentHash::compute(text.as_bytes()),
        buffer: MemoryBuffer::new(display.clone(), text),
        display,
        path,
    })
}

fn offset_at(buffer: &MemoryBuffer, at: &str) -> AmdepsResult<usize> {
    parse_position(buffer.as_str(), at).ok_or_else(|| {
        AmdepsError::invalid_args(format!(
            "invalid position {:?}: expected <line:col> or <byte offset>",
            at
        ))
    })
}

/// Write the edited buffer back (or diff it) and build the response.
fn finish(
    session: &Session,
    command: &str,
    loaded: LoadedFile,
    report: CommandReport,
) -> AmdepsResult<EditResponse> {
    let edits = loaded.buffer.edits().to_vec();
    let changed = report.changed;
    let mut response = EditResponse::from_report(command, &loaded.display, report, edits);

    if session.dry_run {
        response.diff = Some(generate_unified_diff(&response.edits));
        return Ok(response);
    }
    if !changed {
        return Ok(response);
    }

    let on_disk = fs::read(&loaded.path).map_err(|e| AmdepsError::filesystem(&loaded.path, e))?;
    if ContentHash::compute(&on_disk) != loaded.hash {
        return Err(AmdepsError::FileChanged {
            path: loaded.display,
        });
    }
    let text = loaded.buffer.into_text();
    atomic_write(&loaded.path, text.as_bytes())
        .map_err(|e| AmdepsError::filesystem(&loaded.path, e))?;
    response.written = true;
    info!(file = %loaded.display, "file written");

    if session.config.reindex_on_save {
        if let Err(err) = session.rebuild_index() {
            warn!(error = %err, "index rebuild after save failed; keeping previous index");
        }
    }
    Ok(response)
}

// ============================================================================
// Commands
// ============================================================================

/// `amdeps index`: build and store the dependency index.
pub fn run_index(session: &Session) -> AmdepsResult<IndexResponse> {
    let (indexes, built_at) = session.rebuild_index()?;
    Ok(IndexResponse::new(
        session.config.projects.len(),
        indexes.file_count,
        indexes.module_ids.len(),
        session.display_path(&session.store().index_path()),
        built_at,
    ))
}

/// `amdeps update <file>`: re-resolve every parameter, rewrite, sort.
pub fn run_update(
    session: &Session,
    file: &Path,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<EditResponse> {
    let locator = session.locator()?;
    let indexes = session.indexes()?;
    let mut loaded = load_file(session, file)?;
    let report = commands::update_dependencies(&mut loaded.buffer, &locator, &indexes, adapter)?;
    finish(session, "update", loaded, report)
}

/// `amdeps inject <file> --at <pos>`: add the symbol at point as a dependency.
pub fn run_inject(
    session: &Session,
    file: &Path,
    at: &str,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<EditResponse> {
    let locator = session.locator()?;
    let indexes = session.indexes()?;
    let mut loaded = load_file(session, file)?;
    let offset = offset_at(&loaded.buffer, at)?;
    let report = commands::inject_dependency_at_point(
        &mut loaded.buffer,
        &locator,
        &indexes,
        offset,
        adapter,
    )?;
    finish(session, "inject", loaded, report)
}

/// `amdeps inject-relative <file> --at <pos>`: replace the symbol at point
/// with a relative `require` of its file.
pub fn run_inject_relative(
    session: &Session,
    file: &Path,
    at: &str,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<EditResponse> {
    let indexes = session.indexes()?;
    let mut loaded = load_file(session, file)?;
    let offset = offset_at(&loaded.buffer, at)?;
    let absolute = loaded
        .path
        .canonicalize()
        .map_err(|e| AmdepsError::filesystem(&loaded.path, e))?;
    let report = commands::inject_relative_at_point(
        &mut loaded.buffer,
        &absolute,
        &indexes,
        offset,
        adapter,
    )?;
    finish(session, "inject-relative", loaded, report)
}

/// `amdeps sort <file>`: sort dependencies by path.
pub fn run_sort(session: &Session, file: &Path) -> AmdepsResult<EditResponse> {
    let locator = session.locator()?;
    let mut loaded = load_file(session, file)?;
    let report = commands::sort(&mut loaded.buffer, &locator)?;
    finish(session, "sort", loaded, report)
}

/// `amdeps inject-dependencies <file> --dep Name=path...`: write explicit pairs.
pub fn run_inject_dependencies(
    session: &Session,
    file: &Path,
    pairs: &[(String, String)],
    replace: bool,
) -> AmdepsResult<EditResponse> {
    let locator = session.locator()?;
    let mut loaded = load_file(session, file)?;
    let mode = if replace {
        InjectMode::Replace
    } else {
        InjectMode::Point
    };
    inject_dependencies(&mut loaded.buffer, &locator, pairs, mode)?;
    let report = CommandReport {
        changed: loaded.buffer.is_modified(),
        ..CommandReport::default()
    };
    finish(session, "inject-dependencies", loaded, report)
}

/// `amdeps inject-at-point <file> --at <pos> --text <text>`: bounded replace
/// of the word at point.
pub fn run_inject_at_point(
    session: &Session,
    file: &Path,
    at: &str,
    text: &str,
) -> AmdepsResult<EditResponse> {
    let mut loaded = load_file(session, file)?;
    let offset = offset_at(&loaded.buffer, at)?;
    inject_at_point(&mut loaded.buffer, offset, text)?;
    let report = CommandReport {
        changed: loaded.buffer.is_modified(),
        inserted: Some(text.to_string()),
        ..CommandReport::default()
    };
    finish(session, "inject-at-point", loaded, report)
}

// ============================================================================
// Tests
// ============================================================================
