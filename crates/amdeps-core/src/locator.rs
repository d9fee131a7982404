//! Structural locator for AMD module headers.
//!
//! A module header looks like:
//!
//! ```text
//! require.def("app/views/Main",
//!     [
//!         "app/models/Foo",
//!         "app/models/Bar"
//!     ],
//!     function(Foo, Bar) {
//! ```
//!
//! Two regions are coupled by position: the Nth quoted path in the array
//! binds the Nth factory parameter. The locator finds both with ordered
//! pattern searches from the first keyword occurrence. It is not a parser:
//!
//! - the array ends at the *first* `]` after its `[`, so a `]` inside a path
//!   literal truncates it
//! - the parameter list ends at the *first* `)` after `function(`
//! - comments and multi-line string literals are not understood
//!
//! Everything above the [`RegionLocator`] trait only sees spans and parsed
//! lists, so a grammar-backed locator can replace [`PatternLocator`].
//!
//! Spans are snapshots of one buffer state. After any edit, locate again.

use regex::Regex;
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::error::{AmdepsError, AmdepsResult};
use crate::patch::Span;

/// Default dependency-declaration keyword.
pub const DEFAULT_KEYWORD: &str = "require.def";

/// Indent used when the `[` line carries none.
const FALLBACK_INDENT: &str = "    ";

// ============================================================================
// Located State
// ============================================================================

/// The coupled region pair of one buffer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoupledRegions {
    /// Text strictly between `[` and the first following `]`.
    pub path_array: Span,
    /// Text strictly between `function(` and the first following `)`.
    pub param_list: Span,
}

/// Style facts applied to newly written content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingContext {
    /// One indentation level.
    pub indent: String,
    /// Preferred string quote.
    pub quote: char,
}

impl FormattingContext {
    /// Wrap `path` in the preferred quote.
    pub fn quote(&self, path: &str) -> String {
        format!("{q}{}{q}", path, q = self.quote)
    }

    /// Render path-array entries, one per line, two levels in, with the
    /// closing bracket left at one level.
    pub fn format_block(&self, entries: &[String]) -> String {
        let inner = format!("{0}{0}", self.indent);
        if entries.is_empty() {
            return format!("\n{}", self.indent);
        }
        format!(
            "\n{inner}{}\n{}",
            entries.join(&format!(",\n{inner}")),
            self.indent,
            inner = inner
        )
    }
}

/// Parsed snapshot of a module header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHeader {
    /// Region spans in the current text.
    pub regions: CoupledRegions,
    /// Path-array entries, still quoted.
    pub paths: Vec<String>,
    /// Factory parameter names.
    pub class_names: Vec<String>,
    /// Style for new content.
    pub formatting: FormattingContext,
}

// ============================================================================
// Parsing Helpers
// ============================================================================

/// Split path-array content on `,` and trim each entry.
///
/// Whitespace-only content is an empty array; empty entries (a trailing
/// comma) are dropped.
pub fn parse_path_array(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split parameter-list content on `", "`.
pub fn parse_class_names(content: &str) -> Vec<String> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    content
        .split(", ")
        .map(|name| name.trim().to_string())
        .collect()
}

/// Majority vote between `"` and `'`; ties go to `"`.
pub fn majority_quote(text: &str) -> char {
    let double = text.matches('"').count();
    let single = text.matches('\'').count();
    if single > double {
        '\''
    } else {
        '"'
    }
}

// ============================================================================
// RegionLocator
// ============================================================================

/// Finds the coupled regions and formatting facts in a buffer.
pub trait RegionLocator {
    /// Span of the first dependency-declaration keyword.
    fn keyword_span(&self, buffer: &dyn TextBuffer) -> Option<Span>;

    /// Path-array region, if both brackets are found after the keyword.
    fn path_array_region(&self, buffer: &dyn TextBuffer) -> Option<Span>;

    /// Parameter-list region, if `function(` and `)` are found after the keyword.
    fn param_list_region(&self, buffer: &dyn TextBuffer) -> Option<Span>;

    /// One indentation level, taken from the line of the array's `[`.
    fn whitespace_unit(&self, buffer: &dyn TextBuffer) -> String;

    /// Preferred quote for the whole file.
    fn quote_char(&self, buffer: &dyn TextBuffer) -> char {
        majority_quote(buffer.as_str())
    }

    /// Locate both regions or fail with `MalformedModule`.
    fn locate(&self, buffer: &dyn TextBuffer) -> AmdepsResult<CoupledRegions> {
        if self.keyword_span(buffer).is_none() {
            return Err(AmdepsError::malformed("no module declaration found"));
        }
        let path_array = self
            .path_array_region(buffer)
            .ok_or_else(|| AmdepsError::malformed("dependency array not found"))?;
        let param_list = self
            .param_list_region(buffer)
            .ok_or_else(|| AmdepsError::malformed("factory parameter list not found"))?;
        debug!(%path_array, %param_list, "located module header");
        Ok(CoupledRegions {
            path_array,
            param_list,
        })
    }

    /// Locate and parse the whole header.
    fn read(&self, buffer: &dyn TextBuffer) -> AmdepsResult<ModuleHeader> {
        let regions = self.locate(buffer)?;
        Ok(ModuleHeader {
            regions,
            paths: parse_path_array(buffer.substr(regions.path_array)),
            class_names: parse_class_names(buffer.substr(regions.param_list)),
            formatting: FormattingContext {
                indent: self.whitespace_unit(buffer),
                quote: self.quote_char(buffer),
            },
        })
    }
}

// ============================================================================
// PatternLocator
// ============================================================================

/// [`RegionLocator`] built from ordered regex searches.
#[derive(Debug, Clone)]
pub struct PatternLocator {
    keyword: Regex,
    open_bracket: Regex,
    close_bracket: Regex,
    function_open: Regex,
    close_paren: Regex,
}

fn compile(pattern: &str) -> AmdepsResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| AmdepsError::invalid_args(format!("bad pattern {:?}: {}", pattern, e)))
}

impl PatternLocator {
    /// Locator for calls to `keyword` (e.g. `require.def` or `define`).
    pub fn new(keyword: &str) -> AmdepsResult<Self> {
        if keyword.trim().is_empty() {
            return Err(AmdepsError::invalid_args("keyword must not be empty"));
        }
        Ok(PatternLocator {
            keyword: compile(&format!(r"\b{}\s*\(", regex::escape(keyword)))?,
            open_bracket: compile(r"\[")?,
            close_bracket: compile(r"\]")?,
            function_open: compile(r"\bfunction[\s-]*\(")?,
            close_paren: compile(r"\)")?,
        })
    }

    /// Offset of the array's `[`.
    fn open_bracket_span(&self, buffer: &dyn TextBuffer) -> Option<Span> {
        let keyword = self.keyword_span(buffer)?;
        buffer.find_pattern(&self.open_bracket, keyword.end)
    }
}

impl RegionLocator for PatternLocator {
    fn keyword_span(&self, buffer: &dyn TextBuffer) -> Option<Span> {
        buffer.find_pattern(&self.keyword, 0)
    }

    fn path_array_region(&self, buffer: &dyn TextBuffer) -> Option<Span> {
        let open = self.open_bracket_span(buffer)?;
        let close = buffer.find_pattern(&self.close_bracket, open.end)?;
        Some(Span::new(open.end, close.start))
    }

    fn param_list_region(&self, buffer: &dyn TextBuffer) -> Option<Span> {
        let keyword = self.keyword_span(buffer)?;
        let open = buffer.find_pattern(&self.function_open, keyword.end)?;
        let close = buffer.find_pattern(&self.close_paren, open.end)?;
        Some(Span::new(open.end, close.start))
    }

    fn whitespace_unit(&self, buffer: &dyn TextBuffer) -> String {
        let Some(open) = self.open_bracket_span(buffer) else {
            return FALLBACK_INDENT.to_string();
        };
        let line = buffer.line_containing(open.start);
        let indent: String = buffer
            .substr(line)
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        if indent.is_empty() {
            FALLBACK_INDENT.to_string()
        } else {
            indent
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
