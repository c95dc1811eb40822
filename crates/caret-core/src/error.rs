//! Error types and stable error codes for the cursor engine.
//!
//! This module provides the unified error type (`CursorError`) shared by every
//! subsystem (buffer, navigation, actions, pattern extraction), plus the
//! stable integer codes used at the CLI/JSON boundary.
//!
//! ## Propagation Policy
//!
//! Navigation and analysis misses are *not* errors: they surface as `false`,
//! `None`, or empty collections so callers can branch without error handling.
//! Only mutation failures and stale-generation references become typed errors,
//! and they are never retried internally; the caller must re-synchronize
//! (re-`move_to`) before trying again.

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (position out of range, file not found).
    ResolutionError = 3,
    /// Apply errors (buffer conflict, stale generation, failed edit).
    ApplyError = 4,
    /// Pattern generalization failed.
    PatternError = 6,
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

/// Unified error type for cursor operations.
///
/// Every fallible operation in the engine returns this type. Soft outcomes
/// (a structural seek with no match, an unresolved symbol) are expressed as
/// `bool`/`Option` results instead and never appear here.
#[derive(Debug, Error)]
pub enum CursorError {
    /// Invalid arguments from the caller (malformed location, bad options).
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Target line lies outside `[1, line_count]`.
    #[error("position out of range: line {line} not in [1, {line_count}]")]
    PositionOutOfRange { line: u32, line_count: u32 },

    /// A stale buffer generation was referenced, or an edit would leave the
    /// buffer in an invalid state (deleting the last remaining line).
    #[error("buffer conflict: {message}")]
    BufferConflict { message: String },

    /// The AST provider cannot parse this file. Navigation and action
    /// methods degrade to line-only operation.
    #[error("unsupported language: {path}")]
    UnsupportedLanguage { path: String },

    /// The extractor cannot generalize the edit into a single template.
    #[error("pattern generation failed: {reason}")]
    PatternGenerationFailure { reason: String },

    /// File not found in the file store.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Invalid identifier supplied to an action (rename, extract).
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// IO error from the file store.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&CursorError> for OutputErrorCode {
    fn from(err: &CursorError) -> Self {
        match err {
            CursorError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            CursorError::PositionOutOfRange { .. } => OutputErrorCode::ResolutionError,
            CursorError::BufferConflict { .. } => OutputErrorCode::ApplyError,
            CursorError::UnsupportedLanguage { .. } => OutputErrorCode::ResolutionError,
            CursorError::PatternGenerationFailure { .. } => OutputErrorCode::PatternError,
            CursorError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            CursorError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            CursorError::Io(_) => OutputErrorCode::InternalError,
            CursorError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<CursorError> for OutputErrorCode {
    fn from(err: CursorError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl CursorError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CursorError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a buffer conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        CursorError::BufferConflict {
            message: message.into(),
        }
    }

    /// Create a stale-generation conflict with both counter values.
    pub fn stale_generation(expected: u64, actual: u64) -> Self {
        CursorError::BufferConflict {
            message: format!(
                "stale generation referenced (cached {}, buffer at {})",
                expected, actual
            ),
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(line: u32, line_count: u32) -> Self {
        CursorError::PositionOutOfRange { line, line_count }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        CursorError::FileNotFound { path: path.into() }
    }

    /// Create an invalid identifier error.
    pub fn invalid_identifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CursorError::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CursorError::Internal {
            message: message.into(),
        }
    }

    /// Get the stable output code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

// ============================================================================
// Tests
// ============================================================================
