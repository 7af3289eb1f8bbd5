//! In-memory implementation of the storage contracts.
//!
//! [`MemoryEngine`] keeps every relation and index in a process-wide
//! registry. All handles opened for the same name share the same backing
//! data, so a relation reopened after a catalog cache miss sees the rows
//! inserted through the previous handle.
//!
//! Row handles are allocated from a monotonic counter and never reused, so
//! they stay stable across unrelated inserts and deletes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::StorageError;
use super::relation::{Handle, Index, IndexRef, Relation, RelationRef, StorageEngine};
use crate::datum::{DataType, Identifier, Row, Value};
use crate::sql::IndexType;

/// Rows and schema of one created table.
struct TableData {
    column_names: Vec<Identifier>,
    column_attributes: Vec<DataType>,
    /// Live rows keyed by handle; iteration order is scan order.
    rows: BTreeMap<Handle, Vec<Value>>,
    /// Next handle ordinal, never decremented.
    next_row: u64,
}

impl TableData {
    fn column_position(&self, column: &str) -> Result<usize, StorageError> {
        self.column_names
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| StorageError::UnknownColumn {
                column: column.to_string(),
            })
    }

    /// Whether the row's values match an equality predicate.
    fn matches(&self, values: &[Value], predicate: &Row) -> Result<bool, StorageError> {
        for (column, want) in predicate {
            if &values[self.column_position(column)?] != want {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Key → handles of one created index.
struct IndexData {
    key_columns: Vec<Identifier>,
    unique: bool,
    entries: BTreeMap<Vec<Value>, Vec<Handle>>,
}

impl IndexData {
    fn add(&mut self, key: Vec<Value>, handle: Handle, name: &str) -> Result<(), StorageError> {
        let handles = self.entries.entry(key).or_default();
        if self.unique && !handles.is_empty() {
            return Err(StorageError::DuplicateKey {
                index: name.to_string(),
            });
        }
        handles.push(handle);
        Ok(())
    }

    /// Builds the key for a table row, in key-column order.
    fn key_for(&self, table: &TableData, values: &[Value]) -> Result<Vec<Value>, StorageError> {
        self.key_columns
            .iter()
            .map(|column| Ok(values[table.column_position(column)?].clone()))
            .collect()
    }
}

/// Shared registry behind every handle the engine opens.
#[derive(Default)]
struct Registry {
    tables: Mutex<HashMap<Identifier, Arc<Mutex<TableData>>>>,
    indices: Mutex<HashMap<(Identifier, Identifier), Arc<Mutex<IndexData>>>>,
}

impl Registry {
    fn table(&self, name: &str) -> Result<Arc<Mutex<TableData>>, StorageError> {
        self.tables
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::RelationNotFound {
                name: name.to_string(),
            })
    }

    fn index(&self, table: &str, name: &str) -> Result<Arc<Mutex<IndexData>>, StorageError> {
        self.indices
            .lock()
            .get(&(table.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::IndexNotFound {
                table: table.to_string(),
                name: name.to_string(),
            })
    }
}

/// An in-memory storage engine.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    registry: Arc<Registry>,
}

impl MemoryEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryEngine {
    fn open_relation(
        &self,
        name: &str,
        column_names: Vec<Identifier>,
        column_attributes: Vec<DataType>,
    ) -> RelationRef {
        Arc::new(Mutex::new(MemoryRelation {
            name: name.to_string(),
            column_names,
            column_attributes,
            registry: self.registry.clone(),
        }))
    }

    fn open_index(
        &self,
        table: &str,
        name: &str,
        key_columns: Vec<Identifier>,
        _index_type: IndexType,
        unique: bool,
    ) -> IndexRef {
        Arc::new(Mutex::new(MemoryIndex {
            table: table.to_string(),
            name: name.to_string(),
            key_columns,
            unique,
            registry: self.registry.clone(),
        }))
    }
}

/// A handle to a (possibly not yet created) in-memory table.
pub struct MemoryRelation {
    name: Identifier,
    column_names: Vec<Identifier>,
    column_attributes: Vec<DataType>,
    registry: Arc<Registry>,
}

impl Relation for MemoryRelation {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self) -> Result<(), StorageError> {
        let mut tables = self.registry.tables.lock();
        if tables.contains_key(&self.name) {
            return Err(StorageError::RelationExists {
                name: self.name.clone(),
            });
        }
        tables.insert(
            self.name.clone(),
            Arc::new(Mutex::new(TableData {
                column_names: self.column_names.clone(),
                column_attributes: self.column_attributes.clone(),
                rows: BTreeMap::new(),
                next_row: 0,
            })),
        );
        Ok(())
    }

    fn create_if_not_exists(&mut self) -> Result<(), StorageError> {
        match self.create() {
            Err(StorageError::RelationExists { .. }) => Ok(()),
            other => other,
        }
    }

    fn drop(&mut self) -> Result<(), StorageError> {
        self.registry
            .tables
            .lock()
            .remove(&self.name)
            .map(|_| ())
            .ok_or_else(|| StorageError::RelationNotFound {
                name: self.name.clone(),
            })
    }

    fn insert(&mut self, row: &Row) -> Result<Handle, StorageError> {
        let data = self.registry.table(&self.name)?;
        let mut data = data.lock();
        for column in row.keys() {
            data.column_position(column)?;
        }
        let values = data
            .column_names
            .iter()
            .map(|column| {
                row.get(column)
                    .cloned()
                    .ok_or_else(|| StorageError::MissingColumn {
                        column: column.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let handle = Handle::from_ordinal(data.next_row);
        data.next_row += 1;
        data.rows.insert(handle, values);
        Ok(handle)
    }

    fn del(&mut self, handle: Handle) -> Result<(), StorageError> {
        let data = self.registry.table(&self.name)?;
        let result = data
            .lock()
            .rows
            .remove(&handle)
            .map(|_| ())
            .ok_or(StorageError::InvalidHandle);
        result
    }

    fn select(&self, predicate: Option<&Row>) -> Result<Vec<Handle>, StorageError> {
        let data = self.registry.table(&self.name)?;
        let data = data.lock();
        let mut handles = Vec::new();
        for (handle, values) in &data.rows {
            let keep = match predicate {
                Some(predicate) => data.matches(values, predicate)?,
                None => true,
            };
            if keep {
                handles.push(*handle);
            }
        }
        Ok(handles)
    }

    fn project(&self, handle: Handle, columns: &[Identifier]) -> Result<Row, StorageError> {
        let data = self.registry.table(&self.name)?;
        let data = data.lock();
        let values = data.rows.get(&handle).ok_or(StorageError::InvalidHandle)?;
        let mut row = Row::new();
        for column in columns {
            row.insert(column.clone(), values[data.column_position(column)?].clone());
        }
        Ok(row)
    }

    fn column_names(&self) -> &[Identifier] {
        &self.column_names
    }

    fn column_attributes(&self) -> &[DataType] {
        &self.column_attributes
    }
}

/// A handle to a (possibly not yet created) in-memory index.
///
/// BTREE and HASH share one map-backed implementation here; the kind only
/// decides uniqueness. A page-based engine would pick different structures.
pub struct MemoryIndex {
    table: Identifier,
    name: Identifier,
    key_columns: Vec<Identifier>,
    unique: bool,
    registry: Arc<Registry>,
}

impl Index for MemoryIndex {
    fn create(&mut self) -> Result<(), StorageError> {
        let key = (self.table.clone(), self.name.clone());
        {
            let indices = self.registry.indices.lock();
            if indices.contains_key(&key) {
                return Err(StorageError::IndexExists {
                    table: self.table.clone(),
                    name: self.name.clone(),
                });
            }
        }
        let mut data = IndexData {
            key_columns: self.key_columns.clone(),
            unique: self.unique,
            entries: BTreeMap::new(),
        };
        // Index the rows already present in the relation.
        let table = self.registry.table(&self.table)?;
        let table = table.lock();
        for (handle, values) in &table.rows {
            let key_values = data.key_for(&table, values)?;
            data.add(key_values, *handle, &self.name)?;
        }
        self.registry
            .indices
            .lock()
            .insert(key, Arc::new(Mutex::new(data)));
        Ok(())
    }

    fn drop(&mut self) -> Result<(), StorageError> {
        self.registry
            .indices
            .lock()
            .remove(&(self.table.clone(), self.name.clone()))
            .map(|_| ())
            .ok_or_else(|| StorageError::IndexNotFound {
                table: self.table.clone(),
                name: self.name.clone(),
            })
    }

    fn insert(&mut self, handle: Handle) -> Result<(), StorageError> {
        let index = self.registry.index(&self.table, &self.name)?;
        let table = self.registry.table(&self.table)?;
        let table = table.lock();
        let values = table.rows.get(&handle).ok_or(StorageError::InvalidHandle)?;
        let mut index = index.lock();
        let key = index.key_for(&table, values)?;
        index.add(key, handle, &self.name)
    }

    fn del(&mut self, handle: Handle) -> Result<(), StorageError> {
        let index = self.registry.index(&self.table, &self.name)?;
        let mut index = index.lock();
        for handles in index.entries.values_mut() {
            handles.retain(|h| *h != handle);
        }
        index.entries.retain(|_, handles| !handles.is_empty());
        Ok(())
    }

    fn lookup(&self, key: &Row) -> Result<Vec<Handle>, StorageError> {
        let index = self.registry.index(&self.table, &self.name)?;
        let index = index.lock();
        let key_values = index
            .key_columns
            .iter()
            .map(|column| {
                key.get(column)
                    .cloned()
                    .ok_or_else(|| StorageError::MissingColumn {
                        column: column.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(index.entries.get(&key_values).cloned().unwrap_or_default())
    }
}
