//! The relation, index, and storage-engine contracts.
//!
//! These traits are the seam between the execution engine and physical
//! storage. The engine never sees pages or files; it sees named relations,
//! named indices, and opaque row [`Handle`]s.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::StorageError;
use crate::datum::{DataType, Identifier, Row};
use crate::sql::IndexType;

/// An opaque, storage-issued row identity.
///
/// A handle is stable for the lifetime of its row within its relation: it
/// survives unrelated inserts and deletes, and it is the sole token passed
/// between relation, index, and plan layers. The page/slot split mirrors a
/// slotted-page heap; callers must treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    page_no: u32,
    slot: u16,
}

/// Rows per page in handle arithmetic.
const PAGE_CAPACITY: u64 = 64;

impl Handle {
    /// Builds the handle for the `n`th row ever inserted into a relation.
    pub(crate) fn from_ordinal(n: u64) -> Self {
        Handle {
            page_no: (n / PAGE_CAPACITY) as u32,
            slot: (n % PAGE_CAPACITY) as u16,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.page_no, self.slot)
    }
}

/// A shared, lockable relation handle.
///
/// Catalog lookups hand out clones of these; the clone stays valid until
/// the catalog evicts the entry (DROP TABLE).
pub type RelationRef = Arc<Mutex<dyn Relation + Send>>;

/// A shared, lockable index handle.
pub type IndexRef = Arc<Mutex<dyn Index + Send>>;

/// A logical table: a set of rows with an ordered column schema.
pub trait Relation {
    /// The relation's name.
    fn name(&self) -> &str;

    /// Creates the physical relation. Fails if it already exists.
    fn create(&mut self) -> Result<(), StorageError>;

    /// Creates the physical relation if it does not already exist.
    fn create_if_not_exists(&mut self) -> Result<(), StorageError>;

    /// Destroys the physical relation and all its rows.
    fn drop(&mut self) -> Result<(), StorageError>;

    /// Inserts a row, returning its handle.
    ///
    /// The row must supply a value for every schema column; the defaulting
    /// policy for omitted columns belongs to the implementation.
    fn insert(&mut self, row: &Row) -> Result<Handle, StorageError>;

    /// Deletes the row addressed by `handle`.
    fn del(&mut self, handle: Handle) -> Result<(), StorageError>;

    /// Returns the handles of all rows, optionally constrained by an
    /// equality predicate (column name → required value).
    ///
    /// Handle order equals the relation's scan order and is stable within
    /// a single statement execution.
    fn select(&self, predicate: Option<&Row>) -> Result<Vec<Handle>, StorageError>;

    /// Materializes the named columns of the row addressed by `handle`.
    fn project(&self, handle: Handle, columns: &[Identifier]) -> Result<Row, StorageError>;

    /// Column names in declaration order.
    fn column_names(&self) -> &[Identifier];

    /// Column attributes, parallel to [`column_names`](Relation::column_names).
    fn column_attributes(&self) -> &[DataType];
}

/// A named secondary index over a subset of a relation's columns.
pub trait Index {
    /// Creates the physical index, indexing any rows already present in
    /// the underlying relation.
    fn create(&mut self) -> Result<(), StorageError>;

    /// Destroys the physical index.
    fn drop(&mut self) -> Result<(), StorageError>;

    /// Adds the row addressed by `handle` to the index.
    ///
    /// Unique indices reject a key already present.
    fn insert(&mut self, handle: Handle) -> Result<(), StorageError>;

    /// Removes the row addressed by `handle` from the index.
    fn del(&mut self, handle: Handle) -> Result<(), StorageError>;

    /// Returns the handles whose indexed columns equal the values in `key`.
    ///
    /// `key` must carry a value for every indexed column.
    fn lookup(&self, key: &Row) -> Result<Vec<Handle>, StorageError>;
}

/// Factory the catalog uses to open storage-backed objects by name.
///
/// Opening is cheap and does not touch physical state; `create`/`drop` on
/// the returned object do.
pub trait StorageEngine: Send + Sync {
    /// Opens a relation handle for `name` with the given schema.
    fn open_relation(
        &self,
        name: &str,
        column_names: Vec<Identifier>,
        column_attributes: Vec<DataType>,
    ) -> RelationRef;

    /// Opens an index handle for `name` on `table` over `key_columns`.
    fn open_index(
        &self,
        table: &str,
        name: &str,
        key_columns: Vec<Identifier>,
        index_type: IndexType,
        unique: bool,
    ) -> IndexRef;
}
