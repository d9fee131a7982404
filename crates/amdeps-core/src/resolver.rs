//! Choice resolution: one module path per class name.
//!
//! Every class name becomes a queue entry holding its candidates. The queue
//! is drained front to back: single-candidate entries resolve immediately,
//! and an ambiguous entry suspends on the interaction adapter until the user
//! picks one. A cancellation abandons the whole resolution, so callers never
//! see a partial result and never edit text.
//!
//! Names missing from the index are not errors. They resolve to a visible
//! `???/<name>` placeholder that keeps the file well-formed and marks the
//! dependency for manual follow-up.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::error::{AmdepsError, AmdepsResult};
use crate::index::DependencyIndex;
use crate::interaction::InteractionAdapter;

/// Prefix of placeholder paths for names with no index entry.
pub const UNRESOLVED_PREFIX: &str = "???/";

/// Placeholder path for an unresolved class name.
pub fn placeholder(class_name: &str) -> String {
    format!("{}{}", UNRESOLVED_PREFIX, class_name.to_lowercase())
}

/// Class names awaiting resolution, each with its candidate paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    queue: VecDeque<(String, Vec<String>)>,
    unresolved: Vec<String>,
}

impl ResolutionRequest {
    /// Look up every class name, synthesizing placeholders for misses.
    pub fn new(class_names: &[String], index: &DependencyIndex) -> Self {
        let mut unresolved = Vec::new();
        let queue = class_names
            .iter()
            .map(|name| {
                let candidates = match index.candidates(name) {
                    Some(found) if !found.is_empty() => found.to_vec(),
                    _ => {
                        warn!(name = %name, "no index entry; using placeholder");
                        unresolved.push(name.clone());
                        vec![placeholder(name)]
                    }
                };
                (name.clone(), candidates)
            })
            .collect();
        ResolutionRequest { queue, unresolved }
    }

    /// Number of names still queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is drained.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Outcome of a completed resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One path per class name, in class-name order.
    pub paths: Vec<String>,
    /// Names that received a placeholder.
    pub unresolved: Vec<String>,
    /// How many times the user was asked to choose.
    pub prompts: usize,
}

/// Ask the user to pick one of `candidates` for `class_name`.
fn choose(
    class_name: &str,
    candidates: &[String],
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<String> {
    let options: Vec<&str> = candidates.iter().map(String::as_str).collect();
    let prompt = format!("Choose the module for {}", class_name);
    let index = adapter.ask_select(&prompt, &options)?;
    candidates
        .get(index)
        .cloned()
        .ok_or_else(|| AmdepsError::internal(format!("choice {} out of range", index)))
}

/// Drain `request` into one path per class name.
pub fn drain(
    mut request: ResolutionRequest,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<Resolution> {
    let mut resolution = Resolution {
        unresolved: std::mem::take(&mut request.unresolved),
        ..Resolution::default()
    };

    while let Some((class_name, candidates)) = request.queue.pop_front() {
        let path = match candidates.as_slice() {
            [only] => only.clone(),
            _ => {
                resolution.prompts += 1;
                choose(&class_name, &candidates, adapter)?
            }
        };
        debug!(class_name = %class_name, path = %path, "resolved");
        resolution.paths.push(path);
    }
    Ok(resolution)
}

/// Resolve every class name against `index`, in order.
pub fn resolve(
    class_names: &[String],
    index: &DependencyIndex,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<Resolution> {
    drain(ResolutionRequest::new(class_names, index), adapter)
}

/// Resolve a single name; a name with no entry is `SymbolNotFound`.
pub fn resolve_one(
    class_name: &str,
    index: &DependencyIndex,
    adapter: &dyn InteractionAdapter,
) -> AmdepsResult<String> {
    match index.candidates(class_name) {
        None | Some([]) => Err(AmdepsError::SymbolNotFound {
            name: class_name.to_string(),
        }),
        Some([only]) => Ok(only.clone()),
        Some(candidates) => choose(class_name, candidates, adapter),
    }
}

// ============================================================================
// Tests
// ============================================================================
