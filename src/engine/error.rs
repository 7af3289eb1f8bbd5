//! Execution-layer errors.

use std::fmt;

use crate::catalog::CatalogError;
use crate::datum::Identifier;
use crate::storage::StorageError;

/// Errors from statement execution.
///
/// Storage failures keep their historical `DbRelationError: ` display
/// prefix; everything else renders as a plain message.
#[derive(Debug)]
pub enum ExecutorError {
    /// WHERE clause is not an equality conjunction of `column = literal`.
    InvalidPredicate(String),

    /// A literal kind no predicate or value position accepts.
    UnhandledLiteral(String),

    /// INSERT references a column the table does not have.
    UnknownColumn {
        /// Column name.
        column: Identifier,
    },

    /// A named column does not exist in the target table.
    ColumnNotInTable {
        /// Column name.
        column: Identifier,
        /// Table name.
        table: Identifier,
    },

    /// CREATE TABLE with a column type other than INT or TEXT.
    UnrecognizedDataType,

    /// INSERT value whose literal kind does not match the column type.
    InsertDataType,

    /// DROP TABLE targeting a catalog meta-relation.
    DropSchemaTable,

    /// Statement or plan shape the engine cannot execute.
    Unsupported(String),

    /// Catalog lookup failure.
    Catalog(CatalogError),

    /// Storage collaborator failure.
    Storage(StorageError),
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::InvalidPredicate(detail) => {
                write!(f, "invalid statement: {}", detail)
            }
            ExecutorError::UnhandledLiteral(literal) => {
                write!(f, "don't know how to handle {}", literal)
            }
            ExecutorError::UnknownColumn { column } => {
                write!(f, "unknown column {}", column)
            }
            ExecutorError::ColumnNotInTable { column, table } => {
                write!(f, "Column '{}' does not exist in {}", column, table)
            }
            ExecutorError::UnrecognizedDataType => write!(f, "unrecognized data type"),
            ExecutorError::InsertDataType => {
                write!(f, "don't know how to handle data type in INSERT")
            }
            ExecutorError::DropSchemaTable => write!(f, "cannot drop a schema table"),
            ExecutorError::Unsupported(detail) => write!(f, "unsupported: {}", detail),
            ExecutorError::Catalog(e) => write!(f, "{}", e),
            ExecutorError::Storage(e) => write!(f, "DbRelationError: {}", e),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Catalog(e) => Some(e),
            ExecutorError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for ExecutorError {
    fn from(e: StorageError) -> Self {
        ExecutorError::Storage(e)
    }
}

impl From<CatalogError> for ExecutorError {
    fn from(e: CatalogError) -> Self {
        // A storage failure inside the catalog is still a storage failure.
        match e {
            CatalogError::Storage(e) => ExecutorError::Storage(e),
            other => ExecutorError::Catalog(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_keep_prefix() {
        let e = ExecutorError::from(StorageError::InvalidHandle);
        assert_eq!(e.to_string(), "DbRelationError: invalid row handle");

        let e = ExecutorError::from(CatalogError::Storage(StorageError::InvalidHandle));
        assert_eq!(e.to_string(), "DbRelationError: invalid row handle");
    }

    #[test]
    fn test_schema_error_messages() {
        let e = ExecutorError::ColumnNotInTable {
            column: "x".to_string(),
            table: "t".to_string(),
        };
        assert_eq!(e.to_string(), "Column 'x' does not exist in t");
        assert_eq!(
            ExecutorError::DropSchemaTable.to_string(),
            "cannot drop a schema table"
        );
        assert_eq!(
            ExecutorError::InsertDataType.to_string(),
            "don't know how to handle data type in INSERT"
        );
    }
}
