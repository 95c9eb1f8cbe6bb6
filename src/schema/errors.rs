//! Schema error types
//!
//! Error codes:
//! - JSONTABLE_MISSING_FIELD (REJECT)
//! - JSONTABLE_NOT_A_RECORD_KIND (REJECT)
//! - JSONTABLE_INVALID_ROW (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The input is rejected, nothing was written
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A declared field is absent from the input row
    MissingField,
    /// A kind descriptor cannot back a table
    NotARecordKind,
    /// A row is not a JSON object
    InvalidRow,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::MissingField => "JSONTABLE_MISSING_FIELD",
            SchemaErrorCode::NotARecordKind => "JSONTABLE_NOT_A_RECORD_KIND",
            SchemaErrorCode::InvalidRow => "JSONTABLE_INVALID_ROW",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Kind the failing operation was bound to
    kind: Option<String>,
    /// Field the failure refers to
    field: Option<String>,
}

impl SchemaError {
    /// A declared field is absent from the data provided
    pub fn missing_field(kind: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: SchemaErrorCode::MissingField,
            message: format!("Field '{}' was not found in the data provided", field),
            kind: Some(kind.into()),
            field: Some(field),
        }
    }

    /// The kind descriptor cannot back a table
    pub fn not_a_record_kind(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            code: SchemaErrorCode::NotARecordKind,
            message: format!("'{}' is not a record kind: {}", kind, reason.into()),
            kind: Some(kind),
            field: None,
        }
    }

    /// A value that should be a row is not a JSON object
    pub fn invalid_row(kind: impl Into<String>, actual: &str) -> Self {
        Self {
            code: SchemaErrorCode::InvalidRow,
            message: format!("Row must be a JSON object, got {}", actual),
            kind: Some(kind.into()),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
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

    /// Returns the record kind name if known
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Returns the offending field name, for `MissingField`
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
