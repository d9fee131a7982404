//! Host-facing commands.
//!
//! Each command is one entry point a host binds to a keystroke or a CLI
//! subcommand. All of them share one shape: locate and validate first, run
//! every lookup and choice next, and only then edit the buffer. A cancelled
//! choice or a missing symbol therefore leaves the buffer untouched.

use std::path::{Component, Path};

use tracing::info;

use crate::buffer::TextBuffer;
use crate::editor::{inject_at_point, inject_dependencies, InjectMode};
use crate::error::{AmdepsError, AmdepsResult};
use crate::index::DependencyIndexes;
use crate::interaction::InteractionAdapter;
use crate::locator::{majority_quote, RegionLocator};
use crate::patch::Span;
use crate::resolver::{resolve, resolve_one};
use crate::sorter::sort_dependencies;

/// Call wrapped around relative paths outside a `require(...)`.
const REQUIRE_CALL: &str = "require(";

/// What a command did to the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReport {
    /// Whether the buffer text differs from before the command.
    pub changed: bool,
    /// Class names that received a `???/` placeholder.
    pub unresolved: Vec<String>,
    /// Number of choices the user was asked to make.
    pub prompts: usize,
    /// The path or expression written for single-symbol commands.
    pub inserted: Option<String>,
}

/// Identifier touching `offset`, with its span.
fn symbol_at(buffer: &dyn TextBuffer, offset: usize) -> AmdepsResult<(Span, String)> {
    let word = buffer.word_at(offset);
    if word.is_empty() {
        return Err(AmdepsError::NoSymbolAtPoint { offset });
    }
    Ok((word, buffer.substr(word).to_string()))
}

// ============================================================================
// update-dependencies
// ============================================================================

/// Re-resolve every factory parameter and rewrite the path array, sorted.
///
/// Names with no index entry get a placeholder path and are reported in
/// [`CommandReport::unresolved`].
pub fn update_dependencies(
    buffer: &mut dyn TextBuffer,
    locator: &dyn RegionLocator,
    indexes: &DependencyIndexes,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<CommandReport> {
    let header = locator.read(buffer)?;
    let resolution = resolve(&header.class_names, &indexes.module_ids, adapter)?;

    for name in &resolution.unresolved {
        adapter.print_warning(
            &AmdepsError::SymbolNotFound { name: name.clone() }.to_string(),
        );
    }

    let before = buffer.as_str().to_string();
    let pairs: Vec<(String, String)> = header
        .class_names
        .into_iter()
        .zip(resolution.paths)
        .collect();
    inject_dependencies(buffer, locator, &pairs, InjectMode::Replace)?;
    sort_dependencies(buffer, locator)?;

    info!(
        names = pairs.len(),
        unresolved = resolution.unresolved.len(),
        "dependencies updated"
    );
    Ok(CommandReport {
        changed: buffer.as_str() != before,
        unresolved: resolution.unresolved,
        prompts: resolution.prompts,
        inserted: None,
    })
}

// ============================================================================
// inject-dependency-at-point
// ============================================================================

/// Add the symbol at `offset` as a dependency of the module.
pub fn inject_dependency_at_point(
    buffer: &mut dyn TextBuffer,
    locator: &dyn RegionLocator,
    indexes: &DependencyIndexes,
    offset: usize,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<CommandReport> {
    let (_, name) = symbol_at(buffer, offset)?;
    locator.locate(buffer)?;

    let path = resolve_one(&name, &indexes.module_ids, adapter)?;
    let before = buffer.as_str().to_string();
    inject_dependencies(buffer, locator, &[(name, path.clone())], InjectMode::Point)?;

    Ok(CommandReport {
        changed: buffer.as_str() != before,
        inserted: Some(path),
        ..CommandReport::default()
    })
}

// ============================================================================
// inject-relative-at-point
// ============================================================================

/// Path of `target` relative to `from_dir`, in module form.
///
/// Always uses `/`, and starts with `./` unless it climbs with `../`.
pub fn relative_module_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = parts.join("/");
    if joined.starts_with("../") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Text to put in place of the word at `word`, given its surroundings.
fn relative_expression(buffer: &dyn TextBuffer, word: Span, relative: &str) -> String {
    let text = buffer.as_str();
    let before = text[..word.start].chars().next_back();
    let after = text[word.end..].chars().next();
    if let (Some(open), Some(close)) = (before, after) {
        if open == close && (open == '"' || open == '\'') {
            return relative.to_string();
        }
    }

    let quote = majority_quote(text);
    let line = buffer.line_containing(word.start);
    let prefix = &text[line.start..word.start];
    if prefix.trim_end().ends_with(REQUIRE_CALL) {
        format!("{q}{}{q}", relative, q = quote)
    } else {
        format!("{}{q}{}{q})", REQUIRE_CALL, relative, q = quote)
    }
}

/// Replace the symbol at `offset` with a relative `require` of its file.
///
/// `file` is the path of the buffer being edited; candidates come from the
/// absolute-path index.
pub fn inject_relative_at_point(
    buffer: &mut dyn TextBuffer,
    file: &Path,
    indexes: &DependencyIndexes,
    offset: usize,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<CommandReport> {
    let (word, name) = symbol_at(buffer, offset)?;
    let target = resolve_one(&name, &indexes.absolute_paths, adapter)?;

    let from_dir = file.parent().unwrap_or(Path::new(""));
    let relative = relative_module_path(from_dir, Path::new(&target));
    let expression = relative_expression(buffer, word, &relative);

    let before = buffer.as_str().to_string();
    inject_at_point(buffer, offset, &expression)?;
    info!(name = %name, path = %relative, "relative dependency injected");

    Ok(CommandReport {
        changed: buffer.as_str() != before,
        inserted: Some(expression),
        ..CommandReport::default()
    })
}

// ============================================================================
// sort-dependencies
// ============================================================================

/// Sort the module's dependencies by path.
pub fn sort(
    buffer: &mut dyn TextBuffer,
    locator: &dyn RegionLocator,
) -> AmdepsResult<CommandReport> {
    Ok(CommandReport {
        changed: sort_dependencies(buffer, locator)?,
        ..CommandReport::default()
    })
}

// ============================================================================
// Tests
// ============================================================================
