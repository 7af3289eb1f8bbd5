//! Catalog-specific errors.

use std::fmt;

use crate::datum::Identifier;
use crate::storage::StorageError;

/// Errors from catalog lookups and mutations.
#[derive(Debug)]
pub enum CatalogError {
    /// No `_columns` rows exist for the requested table.
    TableNotFound {
        /// Table name.
        name: Identifier,
    },

    /// No `_indices` rows exist for the requested (table, index) pair.
    IndexNotFound {
        /// Table name.
        table: Identifier,
        /// Index name.
        name: Identifier,
    },

    /// A `_columns` row carries a data type the engine does not know.
    UnknownDataType {
        /// The unrecognized type name.
        name: String,
    },

    /// A catalog row has an unexpected shape.
    InvalidEntry(String),

    /// Storage failure while reading or writing catalog relations.
    Storage(StorageError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::TableNotFound { name } => {
                write!(f, "table \"{}\" does not exist", name)
            }
            CatalogError::IndexNotFound { table, name } => {
                write!(f, "index \"{}\" on \"{}\" does not exist", name, table)
            }
            CatalogError::UnknownDataType { name } => {
                write!(f, "unknown data type \"{}\" in catalog", name)
            }
            CatalogError::InvalidEntry(detail) => {
                write!(f, "invalid catalog entry: {}", detail)
            }
            CatalogError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(e: StorageError) -> Self {
        CatalogError::Storage(e)
    }
}
