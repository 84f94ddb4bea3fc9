//! Error types for dbcrud

use std::fmt;

use thiserror::Error;

/// Result type alias for generated CRUD operations
pub type CrudResult<T> = Result<T, CrudError>;

/// The CRUD operation an error was raised by.
///
/// Rendered with the names callers see in error messages (`SelectByID`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Select,
    SelectById,
    Update,
    UpdateById,
    Delete,
    DeleteById,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Insert => "Insert",
            Self::Select => "Select",
            Self::SelectById => "SelectByID",
            Self::Update => "Update",
            Self::UpdateById => "UpdateByID",
            Self::Delete => "Delete",
            Self::DeleteById => "DeleteByID",
        })
    }
}

/// Which payload an unknown key was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// The `set` payload of an update.
    Update,
    /// The `where` payload of a select, update or delete.
    Query,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::Query => "query",
        })
    }
}

/// Error types for generated CRUD operations
#[derive(Debug, Error)]
pub enum CrudError {
    /// Driver error, passed through unchanged
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// A payload key that is not a column of the entity
    #[error("{op}: no such field to {role} - {field}")]
    UnknownField {
        op: Operation,
        role: FieldRole,
        field: String,
    },

    /// By-id lookup matched no row
    #[error("{op}: id not found - {id}")]
    NotFound { op: Operation, id: i64 },

    /// By-id lookup matched more than one row
    #[error("{op}: found {count} entries with id")]
    Ambiguous { op: Operation, count: usize },

    /// By-id mutation affected no row
    #[error("{op}: no such ID")]
    NoSuchId { op: Operation },

    /// Select returned more rows than the generated bound allows
    #[error("select query exceeded max responses ({max})")]
    TooManyRows { max: usize },

    /// The ambient context carries no connection
    #[error("no DB on context")]
    NoConnectionInContext,

    /// The ambient context carries something other than the expected connection type
    #[error("DB context value is not a {expected}")]
    WrongConnectionType { expected: &'static str },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl CrudError {
    /// Create an unknown-field error
    pub fn unknown_field(op: Operation, role: FieldRole, field: impl Into<String>) -> Self {
        Self::UnknownField {
            op,
            role,
            field: field.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an unknown-field error
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, Self::UnknownField { .. })
    }

    /// Check if this is a by-id "not found" error (lookup or mutation)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoSuchId { .. })
    }

    /// Check if this is a row-bound error
    pub fn is_too_many_rows(&self) -> bool {
        matches!(self, Self::TooManyRows { .. })
    }

    /// The operation that raised this error, when known.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::UnknownField { op, .. }
            | Self::NotFound { op, .. }
            | Self::Ambiguous { op, .. }
            | Self::NoSuchId { op } => Some(*op),
            Self::TooManyRows { .. } => Some(Operation::Select),
            _ => None,
        }
    }
}
