//! Dependency sorter: reorders the coupled pair by module path.
//!
//! Entries are paired positionally, sorted by the path text as written
//! (quote character included), and written back so the Nth path still binds
//! the Nth parameter. When the lists differ in length only the first
//! `min(paths, params)` entries are paired and sorted; the unpaired tail of
//! the longer list stays after them in its original order.

use tracing::debug;

use crate::buffer::TextBuffer;
use crate::error::AmdepsResult;
use crate::locator::RegionLocator;

/// Sort the header's dependencies. Returns whether the text changed.
///
/// A header with nothing to pair is left alone. Running it twice leaves the
/// text as the first run left it.
pub fn sort_dependencies(
    buffer: &mut dyn TextBuffer,
    locator: &dyn RegionLocator,
) -> AmdepsResult<bool> {
    let header = locator.read(buffer)?;
    let paired = header.paths.len().min(header.class_names.len());
    if paired == 0 {
        return Ok(false);
    }
    let before = buffer.as_str().to_string();

    if header.paths.len() != header.class_names.len() {
        debug!(
            paths = header.paths.len(),
            params = header.class_names.len(),
            "dependency lists differ in length; sorting paired entries only"
        );
    }

    let mut pairs: Vec<(&String, &String)> = header.paths[..paired]
        .iter()
        .zip(&header.class_names[..paired])
        .collect();
    pairs.sort_by_key(|&(path, _)| path);

    let paths: Vec<String> = pairs
        .iter()
        .map(|&(path, _)| path.clone())
        .chain(header.paths[paired..].iter().cloned())
        .collect();
    let class_names: Vec<String> = pairs
        .iter()
        .map(|&(_, name)| name.clone())
        .chain(header.class_names[paired..].iter().cloned())
        .collect();

    buffer.replace(header.regions.param_list, &class_names.join(", "));
    let regions = locator.locate(buffer)?;
    buffer.replace(
        regions.path_array,
        &header.formatting.format_block(&paths),
    );

    Ok(buffer.as_str() != before)
}

// ============================================================================
// Tests
// ============================================================================
