//! Unified diff rendering of recorded edits.
//!
//! Renders each [`OutputEdit`] as one hunk, in the order the edits were
//! applied. Edits are not merged; a hunk's line numbers refer to the text as
//! it was when that edit ran.

use std::collections::BTreeMap;

use crate::patch::OutputEdit;

/// Split edit text into diff lines; empty text has none.
fn diff_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// Generate a unified diff from recorded edits, grouped by file.
pub fn generate_unified_diff(edits: &[OutputEdit]) -> String {
    let mut by_file: BTreeMap<&str, Vec<&OutputEdit>> = BTreeMap::new();
    for edit in edits {
        by_file.entry(&edit.file).or_default().push(edit);
    }

    let mut diff = String::new();
    for (file, file_edits) in by_file {
        diff.push_str(&format!("--- a/{}\n", file));
        diff.push_str(&format!("+++ b/{}\n", file));

        for edit in file_edits {
            let old_lines = diff_lines(&edit.old_text);
            let new_lines = diff_lines(&edit.new_text);
            diff.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                edit.line,
                old_lines.len(),
                edit.line,
                new_lines.len()
            ));
            for line in old_lines {
                diff.push_str(&format!("-{}\n", line));
            }
            for line in new_lines {
                diff.push_str(&format!("+{}\n", line));
            }
        }
    }

    diff
}

// ============================================================================
// Tests
// ============================================================================
