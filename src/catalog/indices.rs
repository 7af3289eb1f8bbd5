//! The `_indices` catalog and its index cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::CatalogError;
use super::schema;
use crate::datum::{Identifier, Row, Value};
use crate::sql::IndexType;
use crate::storage::{Handle, IndexRef, Relation, RelationRef, StorageEngine};

/// The index catalog.
///
/// Behaves as a relation over `_indices` and resolves (table, index) pairs
/// to open [`IndexRef`]s, materialized on demand from the catalog rows with
/// key columns ordered by `seq_in_index`.
pub struct Indices {
    /// The `_indices` relation.
    relation: RelationRef,
    /// (table, index) → open index.
    cache: Mutex<HashMap<(Identifier, Identifier), IndexRef>>,
    storage: Arc<dyn StorageEngine>,
}

impl Indices {
    /// Wraps the `_indices` relation handle. Called from
    /// [`bootstrap`](super::bootstrap).
    pub(crate) fn new(relation: RelationRef, storage: Arc<dyn StorageEngine>) -> Self {
        Self {
            relation,
            cache: Mutex::new(HashMap::new()),
            storage,
        }
    }

    /// Inserts a row into `_indices`.
    pub fn insert(&self, row: &Row) -> Result<Handle, CatalogError> {
        Ok(self.relation.lock().insert(row)?)
    }

    /// Deletes a row from `_indices`.
    pub fn del(&self, handle: Handle) -> Result<(), CatalogError> {
        Ok(self.relation.lock().del(handle)?)
    }

    /// Selects handles from `_indices`.
    pub fn select(&self, predicate: Option<&Row>) -> Result<Vec<Handle>, CatalogError> {
        Ok(self.relation.lock().select(predicate)?)
    }

    /// Projects an `_indices` row.
    pub fn project(&self, handle: Handle, columns: &[Identifier]) -> Result<Row, CatalogError> {
        Ok(self.relation.lock().project(handle, columns)?)
    }

    /// Returns the distinct index names on `table`, in catalog scan order.
    ///
    /// Callers must not depend on the order.
    pub fn get_index_names(&self, table: &str) -> Result<Vec<Identifier>, CatalogError> {
        let predicate = Row::from([("table_name".to_string(), Value::Text(table.to_string()))]);
        let relation = self.relation.lock();
        let wanted = ["index_name".to_string()];
        let mut names: Vec<Identifier> = Vec::new();
        for handle in relation.select(Some(&predicate))? {
            let row = relation.project(handle, &wanted)?;
            let name = schema::text_value(&row, "index_name")?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Resolves `(table, index)` to an open index.
    ///
    /// Materialized from the `_indices` rows on demand and cached; the
    /// cached handle is returned until [`evict`](Indices::evict).
    pub fn get_index(&self, table: &str, index: &str) -> Result<IndexRef, CatalogError> {
        let key = (table.to_string(), index.to_string());
        if let Some(open) = self.cache.lock().get(&key) {
            return Ok(open.clone());
        }

        let predicate = Row::from([
            ("table_name".to_string(), Value::Text(table.to_string())),
            ("index_name".to_string(), Value::Text(index.to_string())),
        ]);
        let wanted = [
            "seq_in_index".to_string(),
            "column_name".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ];
        let mut columns: Vec<(i32, Identifier)> = Vec::new();
        let mut index_type = IndexType::BTree;
        let mut unique = true;
        {
            let relation = self.relation.lock();
            let handles = relation.select(Some(&predicate))?;
            if handles.is_empty() {
                return Err(CatalogError::IndexNotFound {
                    table: table.to_string(),
                    name: index.to_string(),
                });
            }
            for handle in handles {
                let row = relation.project(handle, &wanted)?;
                columns.push((
                    schema::int_value(&row, "seq_in_index")?,
                    schema::text_value(&row, "column_name")?,
                ));
                let type_name = schema::text_value(&row, "index_type")?;
                index_type = IndexType::from_type_name(&type_name).ok_or_else(|| {
                    CatalogError::InvalidEntry(format!("unknown index type \"{}\"", type_name))
                })?;
                unique = schema::bool_value(&row, "is_unique")?;
            }
        }
        columns.sort_by_key(|(seq, _)| *seq);
        let key_columns = columns.into_iter().map(|(_, name)| name).collect();

        let open = self
            .storage
            .open_index(table, index, key_columns, index_type, unique);
        self.cache.lock().insert(key, open.clone());
        Ok(open)
    }

    /// Drops the cached index handle for `(table, index)`, if any.
    pub fn evict(&self, table: &str, index: &str) {
        self.cache
            .lock()
            .remove(&(table.to_string(), index.to_string()));
    }

    /// Drops every cached index handle for `table` (DROP TABLE).
    pub fn evict_table(&self, table: &str) {
        self.cache.lock().retain(|(t, _), _| t != table);
    }
}
