//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes
//! - Line/column values of 0 are treated as 1

/// Convert a byte offset to 1-indexed line and column.
///
/// Offsets past the end of `content` report the position after the last char.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    let mut current_offset = 0usize;

    for ch in content.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/// Convert 1-indexed line and column to a byte offset.
///
/// A column beyond the end of its line clamps to the line end; a line past
/// the end of the content returns the content length.
pub fn position_to_byte_offset(content: &str, line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let mut current_line = 1u32;
    let mut line_start = 0usize;

    if current_line != line {
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                current_line += 1;
                if current_line == line {
                    line_start = i + 1;
                    break;
                }
            }
        }
        if current_line != line {
            return content.len();
        }
    }

    let mut current_col = 1u32;
    for (j, c) in content[line_start..].char_indices() {
        if current_col == col || c == '\n' {
            return line_start + j;
        }
        current_col += 1;
    }
    content.len()
}

/// Parse a `line:col` or plain byte-offset position string against `content`.
///
/// Returns `None` when the string is neither form.
pub fn parse_position(content: &str, at: &str) -> Option<usize> {
    match at.split_once(':') {
        Some((line, col)) => {
            let line = line.trim().parse::<u32>().ok()?;
            let col = col.trim().parse::<u32>().ok()?;
            Some(position_to_byte_offset(content, line, col))
        }
        None => {
            let offset = at.trim().parse::<usize>().ok()?;
            Some(offset.min(content.len()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
