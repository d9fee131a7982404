//! Region editor: commits resolved dependencies into a module header.
//!
//! The path array and the parameter list are edited as a coupled pair. All
//! lookups and choices happen before this module runs; the editor validates
//! that both regions exist before its first mutation, and re-locates them
//! from fresh text after every insert, since earlier spans are stale by then.

use tracing::{info, warn};

use crate::buffer::TextBuffer;
use crate::error::{AmdepsError, AmdepsResult};
use crate::locator::{parse_class_names, RegionLocator};
use crate::patch::Span;

/// How resolved pairs are merged into the existing header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectMode {
    /// Rebuild the path array from the pairs, in order; parameters stay as-is.
    Replace,
    /// Add missing parameters and set each name's path at its parameter slot.
    Point,
}

/// Write `pairs` of `(class name, module path)` into the header.
///
/// Fails with `MalformedModule` before touching the buffer when either
/// region cannot be located.
pub fn inject_dependencies(
    buffer: &mut dyn TextBuffer,
    locator: &dyn RegionLocator,
    pairs: &[(String, String)],
    mode: InjectMode,
) -> AmdepsResult<()> {
    let header = locator.read(buffer)?;
    let formatting = header.formatting;

    if header.regions.path_array.is_empty() {
        buffer.insert(header.regions.path_array.start, "\n");
    }

    let paths = match mode {
        InjectMode::Replace => pairs
            .iter()
            .map(|(_, path)| formatting.quote(path))
            .collect(),
        InjectMode::Point => {
            let mut paths = header.paths;
            let mut params = locator
                .param_list_region(buffer)
                .ok_or_else(|| AmdepsError::malformed("factory parameter list not found"))?;

            for (class_name, path) in pairs {
                params = ensure_param(buffer, params, class_name);
                let names = parse_class_names(buffer.substr(params));
                let slot = names
                    .iter()
                    .position(|name| name == class_name)
                    .unwrap_or(names.len());
                let quoted = formatting.quote(path);
                if slot < paths.len() {
                    paths[slot] = quoted;
                } else {
                    if slot > paths.len() {
                        warn!(
                            name = %class_name,
                            param_index = slot,
                            path_index = paths.len(),
                            "dependency array shorter than parameter list; path appended out of alignment"
                        );
                    }
                    paths.push(quoted);
                }
            }
            paths
        }
    };

    let regions = locator.locate(buffer)?;
    buffer.replace(regions.path_array, &formatting.format_block(&paths));
    info!(count = pairs.len(), ?mode, "dependencies injected");
    Ok(())
}

/// Append `class_name` to the parameter list unless it is already a whole
/// token there. Returns the (possibly grown) parameter span.
fn ensure_param(buffer: &mut dyn TextBuffer, params: Span, class_name: &str) -> Span {
    let content = buffer.substr(params);
    if parse_class_names(content).iter().any(|name| name == class_name) {
        return params;
    }
    let text = if content.trim().is_empty() {
        class_name.to_string()
    } else {
        format!(", {}", class_name)
    };
    let inserted = buffer.insert(params.end, &text);
    params.grown(inserted)
}

/// Replace the identifier touching `offset` with `text`.
///
/// Returns the span the new text occupies.
pub fn inject_at_point(
    buffer: &mut dyn TextBuffer,
    offset: usize,
    text: &str,
) -> AmdepsResult<Span> {
    let word = buffer.word_at(offset);
    if word.is_empty() {
        return Err(AmdepsError::NoSymbolAtPoint { offset });
    }
    buffer.replace(word, text);
    Ok(Span::new(word.start, word.start + text.len()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::locator::{PatternLocator, DEFAULT_KEYWORD};

    const HEADER: &str = "require.def(\"app/Main\",\n    [\n        \"a\",\n        \"b\"\n    ],\n    function(Alpha, Beta) {\n    }\n);\n";

    fn locator() -> PatternLocator {
        PatternLocator::new(DEFAULT_KEYWORD).unwrap()
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(n, p)| (n.to_string(), p.to_string()))
            .collect()
    }

    mod point_mode_tests {
        use super::*;

        #[test]
        fn absent_name_appends_param_and_path() {
            let mut buf = MemoryBuffer::new("m.js", HEADER);
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("Gamma", "models/Gamma")]),
                InjectMode::Point,
            )
            .unwrap();
            assert_eq!(
                buf.as_str(),
                "require.def(\"app/Main\",\n    [\n        \"a\",\n        \"b\",\n        \"models/Gamma\"\n    ],\n    function(Alpha, Beta, Gamma) {\n    }\n);\n"
            );
        }

        #[test]
        fn short_path_array_appends_after_existing_paths() {
            let mut buf = MemoryBuffer::new(
                "m.js",
                "require.def('m',\n    ['a/A'],\n    function(A, B) {});",
            );
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("C", "c/C")]),
                InjectMode::Point,
            )
            .unwrap();
            let header = locator().read(&buf).unwrap();
            assert_eq!(header.class_names, ["A", "B", "C"]);
            assert_eq!(header.paths, ["'a/A'", "'c/C'"]);
        }

        #[test]
        fn present_name_overwrites_its_slot() {
            let mut buf = MemoryBuffer::new("m.js", HEADER);
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("Beta", "lib/Beta")]),
                InjectMode::Point,
            )
            .unwrap();
            let header = locator().read(&buf).unwrap();
            assert_eq!(header.paths, ["\"a\"", "\"lib/Beta\""]);
            assert_eq!(header.class_names, ["Alpha", "Beta"]);
        }

        #[test]
        fn empty_header_gets_first_dependency() {
            let mut buf = MemoryBuffer::new("m.js", "require.def('m',\n    [],\n    function() {});");
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("Foo", "p/Foo")]),
                InjectMode::Point,
            )
            .unwrap();
            assert_eq!(
                buf.as_str(),
                "require.def('m',\n    [\n        'p/Foo'\n    ],\n    function(Foo) {});"
            );
        }

        #[test]
        fn multiple_names_stay_aligned() {
            let mut buf = MemoryBuffer::new("m.js", HEADER);
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("Gamma", "g/Gamma"), ("Alpha", "x/Alpha"), ("Delta", "d/Delta")]),
                InjectMode::Point,
            )
            .unwrap();
            let header = locator().read(&buf).unwrap();
            assert_eq!(header.class_names, ["Alpha", "Beta", "Gamma", "Delta"]);
            assert_eq!(
                header.paths,
                ["\"x/Alpha\"", "\"b\"", "\"g/Gamma\"", "\"d/Delta\""]
            );
        }

        #[test]
        fn name_as_substring_is_not_a_match() {
            let mut buf = MemoryBuffer::new("m.js", HEADER);
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("Alp", "p/Alp")]),
                InjectMode::Point,
            )
            .unwrap();
            let header = locator().read(&buf).unwrap();
            assert_eq!(header.class_names, ["Alpha", "Beta", "Alp"]);
        }
    }

    mod replace_mode_tests {
        use super::*;

        #[test]
        fn replace_rebuilds_array_and_keeps_params() {
            let mut buf = MemoryBuffer::new("m.js", HEADER);
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("Alpha", "x/Alpha"), ("Beta", "???/beta")]),
                InjectMode::Replace,
            )
            .unwrap();
            let header = locator().read(&buf).unwrap();
            assert_eq!(header.paths, ["\"x/Alpha\"", "\"???/beta\""]);
            assert_eq!(header.class_names, ["Alpha", "Beta"]);
        }

        #[test]
        fn replace_uses_file_quote_style() {
            let mut buf = MemoryBuffer::new(
                "m.js",
                "require.def('m',\n  [\n    'old'\n  ],\n  function(A) {});",
            );
            inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("A", "new/A")]),
                InjectMode::Replace,
            )
            .unwrap();
            assert_eq!(
                buf.as_str(),
                "require.def('m',\n  [\n    'new/A'\n  ],\n  function(A) {});"
            );
        }
    }

    mod failure_tests {
        use super::*;

        #[test]
        fn malformed_header_leaves_buffer_untouched() {
            let text = "require.def('m', ['a'], notAFunction);";
            let mut buf = MemoryBuffer::new("m.js", text);
            let err = inject_dependencies(
                &mut buf,
                &locator(),
                &pairs(&[("A", "p/A")]),
                InjectMode::Point,
            )
            .unwrap_err();
            assert!(matches!(err, AmdepsError::MalformedModule { .. }));
            assert_eq!(buf.as_str(), text);
            assert!(!buf.is_modified());
        }
    }

    mod at_point_tests {
        use super::*;

        #[test]
        fn replaces_word_under_cursor() {
            let mut buf = MemoryBuffer::new("m.js", "var x = Foo;");
            let span = inject_at_point(&mut buf, 9, "require('./Foo')").unwrap();
            assert_eq!(buf.as_str(), "var x = require('./Foo');");
            assert_eq!(buf.substr(span), "require('./Foo')");
        }

        #[test]
        fn no_word_is_error() {
            let mut buf = MemoryBuffer::new("m.js", "a  b");
            assert!(matches!(
                inject_at_point(&mut buf, 2, "x"),
                Err(AmdepsError::NoSymbolAtPoint { offset: 2 })
            ));
        }
    }
}
