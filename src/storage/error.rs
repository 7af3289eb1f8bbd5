//! Storage-layer errors.

use std::fmt;

use crate::datum::Identifier;

/// Errors from [`Relation`](super::Relation) and [`Index`](super::Index)
/// operations.
///
/// The execution layer wraps these into its own error kind; see
/// [`ExecutorError`](crate::engine::ExecutorError).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Relation already physically exists.
    RelationExists {
        /// Relation name.
        name: Identifier,
    },

    /// Relation has not been created (or was dropped).
    RelationNotFound {
        /// Relation name.
        name: Identifier,
    },

    /// Index already physically exists.
    IndexExists {
        /// Table the index is on.
        table: Identifier,
        /// Index name.
        name: Identifier,
    },

    /// Index has not been created (or was dropped).
    IndexNotFound {
        /// Table the index is on.
        table: Identifier,
        /// Index name.
        name: Identifier,
    },

    /// Column not present in the relation's schema.
    UnknownColumn {
        /// Column name.
        column: Identifier,
    },

    /// Row is missing a value for a schema column.
    MissingColumn {
        /// Column name.
        column: Identifier,
    },

    /// Insert would duplicate a key in a unique index.
    DuplicateKey {
        /// Index name.
        index: Identifier,
    },

    /// Handle does not address a live row.
    InvalidHandle,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::RelationExists { name } => {
                write!(f, "relation \"{}\" already exists", name)
            }
            StorageError::RelationNotFound { name } => {
                write!(f, "relation \"{}\" does not exist", name)
            }
            StorageError::IndexExists { table, name } => {
                write!(f, "index \"{}\" on \"{}\" already exists", name, table)
            }
            StorageError::IndexNotFound { table, name } => {
                write!(f, "index \"{}\" on \"{}\" does not exist", name, table)
            }
            StorageError::UnknownColumn { column } => {
                write!(f, "unknown column \"{}\"", column)
            }
            StorageError::MissingColumn { column } => {
                write!(f, "missing value for column \"{}\"", column)
            }
            StorageError::DuplicateKey { index } => {
                write!(f, "duplicate key in unique index \"{}\"", index)
            }
            StorageError::InvalidHandle => write!(f, "invalid row handle"),
        }
    }
}

impl std::error::Error for StorageError {}
