//! JSON output types for CLI responses.
//!
//! Every response is a single JSON object with `status` as its first field
//! and a `schema_version`, so hosts can parse stdout without sniffing.
//! Absent optional fields are omitted rather than written as `null`.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::commands::CommandReport;
use crate::error::{AmdepsError, OutputErrorCode};

pub use crate::patch::OutputEdit as Edit;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Warning code for a class name that received a placeholder.
pub const UNRESOLVED_NAME: &str = "unresolved_name";

// ============================================================================
// Common Types
// ============================================================================

/// Warning information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Warning {
    /// Stable warning code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Warning {
    /// Create a warning.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Warning {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Warning for a name written as a `???/` placeholder.
    pub fn unresolved(name: &str) -> Self {
        Warning::new(
            UNRESOLVED_NAME,
            format!(
                "{}; wrote a placeholder path",
                AmdepsError::SymbolNotFound {
                    name: name.to_string()
                }
            ),
        )
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the `index` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Number of project roots walked.
    pub projects: usize,
    /// Number of files indexed.
    pub files: usize,
    /// Number of distinct class names.
    pub names: usize,
    /// Where the index was stored.
    pub index_path: String,
    /// When the index was built.
    pub built_at: String,
}

impl IndexResponse {
    /// Create a new index response.
    pub fn new(
        projects: usize,
        files: usize,
        names: usize,
        index_path: impl Into<String>,
        built_at: impl Into<String>,
    ) -> Self {
        IndexResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            projects,
            files,
            names,
            index_path: index_path.into(),
            built_at: built_at.into(),
        }
    }
}

/// Response for every command that edits a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Command that ran.
    pub command: String,
    /// File that was edited.
    pub file: String,
    /// Whether the text changed.
    pub changed: bool,
    /// Whether the file was written to disk.
    pub written: bool,
    /// Number of interactive choices made.
    pub prompts: usize,
    /// Path or expression written by single-symbol commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<String>,
    /// Edits in the order they were applied.
    pub edits: Vec<Edit>,
    /// Unified diff of the edits (dry runs only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Warnings (may be empty).
    pub warnings: Vec<Warning>,
}

impl EditResponse {
    /// Build a response from a command report and its recorded edits.
    pub fn from_report(
        command: impl Into<String>,
        file: impl Into<String>,
        report: CommandReport,
        edits: Vec<Edit>,
    ) -> Self {
        let warnings = report
            .unresolved
            .iter()
            .map(|name| Warning::unresolved(name.as_str()))
            .collect();
        EditResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            command: command.into(),
            file: file.into(),
            changed: report.changed,
            written: false,
            prompts: report.prompts,
            inserted: report.inserted,
            edits,
            diff: None,
            warnings,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the exit status.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from an AmdepsError.
    pub fn from_error(err: &AmdepsError) -> Self {
        let details = match err {
            AmdepsError::SymbolNotFound { name } => Some(serde_json::json!({ "name": name })),
            AmdepsError::MalformedModule { reason } => {
                Some(serde_json::json!({ "reason": reason }))
            }
            AmdepsError::NoSymbolAtPoint { offset } => {
                Some(serde_json::json!({ "offset": offset }))
            }
            AmdepsError::Filesystem { path, .. } | AmdepsError::FileChanged { path } => {
                Some(serde_json::json!({ "path": path }))
            }
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from an AmdepsError.
    pub fn from_error(err: &AmdepsError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
