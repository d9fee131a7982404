//! Text buffer capability used by the locator and editor.
//!
//! The engine only needs a handful of primitives from its host: pattern
//! search, substring reads, region replace, insert, and two cursor helpers.
//! [`TextBuffer`] names exactly those. [`MemoryBuffer`] implements them over
//! an owned `String` and keeps an ordered log of every mutation, which the
//! CLI reports as edits or renders as a diff.

use regex::Regex;

use crate::patch::{OutputEdit, Span};
use crate::text::byte_offset_to_position;

/// Host text buffer capability.
pub trait TextBuffer {
    /// First match of `pattern` starting at byte offset `from`.
    fn find_pattern(&self, pattern: &Regex, from: usize) -> Option<Span>;

    /// Text covered by `span` (clamped to the buffer).
    fn substr(&self, span: Span) -> &str;

    /// Replace the text covered by `span` with `text`.
    fn replace(&mut self, span: Span, text: &str);

    /// Insert `text` at `offset`, returning the number of bytes inserted.
    fn insert(&mut self, offset: usize, text: &str) -> usize;

    /// Span of the line holding `offset`, excluding its newline.
    fn line_containing(&self, offset: usize) -> Span;

    /// Span of the identifier touching `offset`; empty when there is none.
    fn word_at(&self, offset: usize) -> Span;

    /// Whole buffer contents.
    fn as_str(&self) -> &str;
}

/// Identifier characters for `word_at`.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

// ============================================================================
// MemoryBuffer
// ============================================================================

/// `String`-backed [`TextBuffer`] that records its edits.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    file: String,
    text: String,
    edits: Vec<OutputEdit>,
}

impl MemoryBuffer {
    /// Create a buffer labelled `file` holding `text`.
    pub fn new(file: impl Into<String>, text: impl Into<String>) -> Self {
        MemoryBuffer {
            file: file.into(),
            text: text.into(),
            edits: Vec::new(),
        }
    }

    /// Label used for recorded edits.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Edits applied so far, in application order.
    pub fn edits(&self) -> &[OutputEdit] {
        &self.edits
    }

    /// Whether any edit has been applied.
    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Consume the buffer, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Clamp `offset` into the buffer and back onto a char boundary.
    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    fn clamp_span(&self, span: Span) -> Span {
        let start = self.clamp(span.start);
        Span::new(start, self.clamp(span.end).max(start))
    }
}

impl TextBuffer for MemoryBuffer {
    fn find_pattern(&self, pattern: &Regex, from: usize) -> Option<Span> {
        if from > self.text.len() {
            return None;
        }
        pattern
            .find_at(&self.text, self.clamp(from))
            .map(|m| Span::new(m.start(), m.end()))
    }

    fn substr(&self, span: Span) -> &str {
        let span = self.clamp_span(span);
        &self.text[span.start..span.end]
    }

    fn replace(&mut self, span: Span, text: &str) {
        let span = self.clamp_span(span);
        let old_text = self.text[span.start..span.end].to_string();
        if old_text == text {
            return;
        }
        let (line, col) = byte_offset_to_position(&self.text, span.start);
        self.edits.push(OutputEdit {
            file: self.file.clone(),
            span,
            old_text,
            new_text: text.to_string(),
            line,
            col,
        });
        self.text.replace_range(span.start..span.end, text);
    }

    fn insert(&mut self, offset: usize, text: &str) -> usize {
        let offset = self.clamp(offset);
        self.replace(Span::empty(offset), text);
        text.len()
    }

    fn line_containing(&self, offset: usize) -> Span {
        let offset = self.clamp(offset);
        let start = self.text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |i| offset + i);
        Span::new(start, end)
    }

    fn word_at(&self, offset: usize) -> Span {
        let offset = self.clamp(offset);
        let start = self.text[..offset]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map_or(offset, |(i, _)| i);
        let end = self.text[offset..]
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map_or(self.text.len(), |(i, _)| offset + i);
        Span::new(start, end)
    }

    fn as_str(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> MemoryBuffer {
        MemoryBuffer::new("main.js", text)
    }

    mod search_tests {
        use super::*;

        #[test]
        fn find_pattern_respects_from_offset() {
            let buf = buffer("foo bar foo");
            let re = Regex::new("foo").unwrap();
            assert_eq!(buf.find_pattern(&re, 0), Some(Span::new(0, 3)));
            assert_eq!(buf.find_pattern(&re, 1), Some(Span::new(8, 11)));
            assert_eq!(buf.find_pattern(&re, 9), None);
        }

        #[test]
        fn find_pattern_past_end_is_none() {
            let buf = buffer("abc");
            let re = Regex::new("").unwrap();
            assert_eq!(buf.find_pattern(&re, 10), None);
        }

        #[test]
        fn substr_clamps_to_buffer() {
            let buf = buffer("hello");
            assert_eq!(buf.substr(Span::new(1, 3)), "el");
            assert_eq!(buf.substr(Span::new(3, 99)), "lo");
        }
    }

    mod mutation_tests {
        use super::*;

        #[test]
        fn replace_records_edit_with_position() {
            let mut buf = buffer("a\nfunction(Foo)");
            buf.replace(Span::new(11, 14), "Bar");
            assert_eq!(buf.as_str(), "a\nfunction(Bar)");
            let edit = &buf.edits()[0];
            assert_eq!(edit.old_text, "Foo");
            assert_eq!(edit.new_text, "Bar");
            assert_eq!((edit.line, edit.col), (2, 10));
            assert_eq!(edit.file, "main.js");
        }

        #[test]
        fn identical_replace_is_not_an_edit() {
            let mut buf = buffer("same");
            buf.replace(Span::new(0, 4), "same");
            assert!(!buf.is_modified());
        }

        #[test]
        fn insert_returns_inserted_length() {
            let mut buf = buffer("(A)");
            let n = buf.insert(2, ", B");
            assert_eq!(n, 3);
            assert_eq!(buf.as_str(), "(A, B)");
            assert!(buf.is_modified());
        }
    }

    mod cursor_tests {
        use super::*;

        #[test]
        fn line_containing_excludes_newline() {
            let buf = buffer("one\n    two\nthree");
            assert_eq!(buf.line_containing(6), Span::new(4, 11));
            assert_eq!(buf.line_containing(0), Span::new(0, 3));
            assert_eq!(buf.line_containing(15), Span::new(12, 17));
        }

        #[test]
        fn word_at_inside_and_at_edges() {
            let buf = buffer("var x = new Foo_bar();");
            assert_eq!(buf.substr(buf.word_at(14)), "Foo_bar");
            assert_eq!(buf.substr(buf.word_at(12)), "Foo_bar");
            assert_eq!(buf.substr(buf.word_at(19)), "Foo_bar");
        }

        #[test]
        fn word_at_whitespace_is_empty() {
            let buf = buffer("a  b");
            assert!(buf.word_at(2).is_empty());
        }

        #[test]
        fn word_at_stops_at_non_ascii_letters() {
            let buf = buffer("x = caf\u{e9}$Bar;");
            assert_eq!(buf.substr(buf.word_at(4)), "caf");
            assert_eq!(buf.substr(buf.word_at(10)), "$Bar");
        }
    }
}
