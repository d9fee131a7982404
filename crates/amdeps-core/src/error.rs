//! Error types and error code constants for amdeps.
//!
//! `AmdepsError` is the single error type commands return. Subsystem errors
//! (interaction, IO) are bridged into it with `From` impls, and every variant
//! maps onto a stable `OutputErrorCode` used both in JSON error responses and
//! as the process exit code:
//!
//! - `2`: Invalid arguments or configuration
//! - `3`: Resolution errors (no index yet, symbol not indexed, nothing at point)
//! - `4`: Apply errors (malformed module header, file changed, filesystem)
//! - `6`: The user cancelled an interactive choice
//! - `10`: Internal errors
//!
//! An unresolved class name is deliberately absent here: it becomes a
//! `???/<name>` placeholder plus a response warning, never an error.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::interaction::InteractionError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric error codes for JSON output and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration from the caller.
    InvalidArguments = 2,
    /// A name, index, or position could not be resolved.
    ResolutionError = 3,
    /// The edit could not be applied.
    ApplyError = 4,
    /// The user cancelled an interactive selection.
    Cancelled = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for every amdeps operation.
#[derive(Debug, Error)]
pub enum AmdepsError {
    /// No dependency index has been built for this session yet.
    #[error("no dependency index available; run `amdeps index` first")]
    IndexUnavailable,

    /// The module header is missing a structural marker.
    #[error("malformed module header: {reason}")]
    MalformedModule { reason: String },

    /// The user cancelled an interactive choice; nothing was edited.
    #[error("selection cancelled")]
    SelectionCancelled,

    /// Directory traversal or file IO failed.
    #[error("filesystem error at {path}: {message}")]
    Filesystem { path: String, message: String },

    /// The class name has no entry in any indexed project.
    #[error("\"{name}\" was not found in any of your dependent projects")]
    SymbolNotFound { name: String },

    /// The cursor is not on an identifier.
    #[error("no identifier at offset {offset}")]
    NoSymbolAtPoint { offset: usize },

    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The file on disk changed between reading and writing it.
    #[error("file changed on disk since it was read: {path}")]
    FileChanged { path: String },

    /// The configuration file could not be used.
    #[error("config error: {message}")]
    Config { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Result alias used throughout the crate.
pub type AmdepsResult<T> = Result<T, AmdepsError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&AmdepsError> for OutputErrorCode {
    fn from(err: &AmdepsError) -> Self {
        match err {
            AmdepsError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            AmdepsError::Config { .. } => OutputErrorCode::InvalidArguments,
            AmdepsError::IndexUnavailable => OutputErrorCode::ResolutionError,
            AmdepsError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            AmdepsError::NoSymbolAtPoint { .. } => OutputErrorCode::ResolutionError,
            AmdepsError::MalformedModule { .. } => OutputErrorCode::ApplyError,
            AmdepsError::FileChanged { .. } => OutputErrorCode::ApplyError,
            AmdepsError::Filesystem { .. } => OutputErrorCode::ApplyError,
            AmdepsError::SelectionCancelled => OutputErrorCode::Cancelled,
            AmdepsError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<AmdepsError> for OutputErrorCode {
    fn from(err: AmdepsError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: InteractionError -> AmdepsError
// ============================================================================

impl From<InteractionError> for AmdepsError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::Cancelled => AmdepsError::SelectionCancelled,
            other => AmdepsError::InternalError {
                message: other.to_string(),
            },
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl AmdepsError {
    /// Create a malformed module error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        AmdepsError::MalformedModule {
            reason: reason.into(),
        }
    }

    /// Create a filesystem error for `path`.
    pub fn filesystem(path: &Path, err: impl fmt::Display) -> Self {
        AmdepsError::Filesystem {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        AmdepsError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AmdepsError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
