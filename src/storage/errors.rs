//! Table store error types
//!
//! Error codes:
//! - JSONTABLE_STORAGE_READ_FAILED (ERROR severity)
//! - JSONTABLE_STORAGE_WRITE_FAILED (ERROR severity)
//! - JSONTABLE_MALFORMED_TABLE (FATAL severity)

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The call fails, the table file is untouched
    Error,
    /// The table file cannot be trusted and must be repaired by hand
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Table file could not be opened or read
    ReadFailed,
    /// Table file could not be written, synced or renamed into place
    WriteFailed,
    /// Table file is not a JSON array of objects
    MalformedTable,
}

impl StorageErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::ReadFailed => "JSONTABLE_STORAGE_READ_FAILED",
            StorageErrorCode::WriteFailed => "JSONTABLE_STORAGE_WRITE_FAILED",
            StorageErrorCode::MalformedTable => "JSONTABLE_MALFORMED_TABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::ReadFailed => Severity::Error,
            StorageErrorCode::WriteFailed => Severity::Error,
            StorageErrorCode::MalformedTable => Severity::Fatal,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with the table path and the underlying I/O failure, if any
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a read failure for the given table file
    pub fn read_failed(path: &Path, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::ReadFailed,
            message: format!("Failed to read table file: {}", path.display()),
            details: None,
            source: Some(source),
        }
    }

    /// Create a write failure with a description of the failed step
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::WriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a write failure that did not originate from an I/O call
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::WriteFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a malformed table error for the given table file
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MalformedTable,
            message: reason.into(),
            details: Some(format!("table: {}", path.display())),
            source: None,
        }
    }

    /// Create a malformed table error at the given byte offset
    pub fn malformed_at_offset(path: &Path, offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MalformedTable,
            message: reason.into(),
            details: Some(format!("table: {}, byte_offset: {}", path.display(), offset)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns the underlying I/O error, untranslated
    pub fn io_error(&self) -> Option<&io::Error> {
        self.source.as_ref()
    }

    /// Returns whether the table file itself is unusable
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
