//! Span and edit-record types shared by the locator, buffer and editor.
//!
//! Spans are immutable values. Any operation that mutates text invalidates
//! every span computed before it; callers re-locate from fresh text instead
//! of adjusting old spans in place.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into a text buffer.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Empty span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// A copy of this span with `end` moved by `delta` bytes.
    pub fn grown(&self, delta: usize) -> Span {
        Span::new(self.start, self.end + delta)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Recorded Edits
// ============================================================================

/// One text mutation as it was applied, for JSON output and diff previews.
///
/// `span` addresses the text as it was immediately before this edit, so a
/// sequence of edits must be replayed in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEdit {
    /// File the edit belongs to.
    pub file: String,
    /// Replaced range before the edit.
    pub span: Span,
    /// Text that was replaced (empty for inserts).
    pub old_text: String,
    /// Text written in its place.
    pub new_text: String,
    /// 1-indexed line of `span.start`.
    pub line: u32,
    /// 1-indexed column of `span.start`.
    pub col: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod span_tests {
        use super::*;

        #[test]
        fn span_len_and_empty() {
            let span = Span::new(3, 8);
            assert_eq!(span.len(), 5);
            assert!(!span.is_empty());
            assert!(Span::empty(4).is_empty());
        }

        #[test]
        #[should_panic(expected = "must be <= end")]
        fn span_rejects_inverted_range() {
            let _ = Span::new(5, 2);
        }

        #[test]
        fn grown_moves_only_the_end() {
            let span = Span::new(10, 14).grown(6);
            assert_eq!(span, Span::new(10, 20));
        }

        #[test]
        fn display_is_half_open() {
            assert_eq!(Span::new(1, 3).to_string(), "[1, 3)");
        }
    }

    mod hash_tests {
        use super::*;

        #[test]
        fn same_bytes_produce_same_hash() {
            let content = b"require.def('a', [], function() {});";
            assert_eq!(ContentHash::compute(content), ContentHash::compute(content));
        }

        #[test]
        fn different_bytes_produce_different_hash() {
            assert_ne!(ContentHash::compute(b"a"), ContentHash::compute(b"b"));
        }

        #[test]
        fn hash_is_hex_sha256() {
            let hash = ContentHash::compute(b"");
            assert_eq!(hash.0.len(), 64);
            assert!(hash.0.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
