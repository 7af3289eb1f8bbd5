//! The `_tables` catalog and its relation cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::CatalogError;
use super::schema::{self, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME, TABLES_TABLE_NAME};
use crate::datum::{DataType, Identifier, Row, Value};
use crate::storage::{Handle, Relation, RelationRef, StorageEngine};

/// The table catalog.
///
/// Behaves as a relation over `_tables` (insert/del/select/project
/// delegate to it) and resolves names to open [`RelationRef`]s. User
/// relations are materialized on demand from their `_columns` rows and
/// cached; the meta-relations resolve to the catalog's own handles.
pub struct Tables {
    /// The `_tables` relation.
    relation: RelationRef,
    /// The `_columns` relation.
    columns: RelationRef,
    /// The `_indices` relation.
    indices: RelationRef,
    /// name → open relation, user tables only.
    cache: Mutex<HashMap<Identifier, RelationRef>>,
    storage: Arc<dyn StorageEngine>,
}

impl Tables {
    /// Wraps the three meta-relation handles. Called from
    /// [`bootstrap`](super::bootstrap).
    pub(crate) fn new(
        relation: RelationRef,
        columns: RelationRef,
        indices: RelationRef,
        storage: Arc<dyn StorageEngine>,
    ) -> Self {
        Self {
            relation,
            columns,
            indices,
            cache: Mutex::new(HashMap::new()),
            storage,
        }
    }

    /// Inserts a row into `_tables`.
    pub fn insert(&self, row: &Row) -> Result<Handle, CatalogError> {
        Ok(self.relation.lock().insert(row)?)
    }

    /// Deletes a row from `_tables` and evicts the named relation from the
    /// cache.
    pub fn del(&self, handle: Handle) -> Result<(), CatalogError> {
        let name = {
            let relation = self.relation.lock();
            let row = relation.project(handle, &["table_name".to_string()])?;
            schema::text_value(&row, "table_name")?
        };
        self.relation.lock().del(handle)?;
        self.evict(&name);
        Ok(())
    }

    /// Selects handles from `_tables`.
    pub fn select(&self, predicate: Option<&Row>) -> Result<Vec<Handle>, CatalogError> {
        Ok(self.relation.lock().select(predicate)?)
    }

    /// Projects a `_tables` row.
    pub fn project(&self, handle: Handle, columns: &[Identifier]) -> Result<Row, CatalogError> {
        Ok(self.relation.lock().project(handle, columns)?)
    }

    /// Resolves `name` to an open relation.
    ///
    /// The meta-relations resolve to the catalog's own handles. A user
    /// table is looked up in `_columns`, opened through the storage engine,
    /// and cached; the cached handle is returned until
    /// [`evict`](Tables::evict).
    pub fn get_table(&self, name: &str) -> Result<RelationRef, CatalogError> {
        match name {
            TABLES_TABLE_NAME => return Ok(self.relation.clone()),
            COLUMNS_TABLE_NAME => return Ok(self.columns.clone()),
            INDICES_TABLE_NAME => return Ok(self.indices.clone()),
            _ => {}
        }
        if let Some(relation) = self.cache.lock().get(name) {
            return Ok(relation.clone());
        }

        let (column_names, column_attributes) = self.read_schema(name)?;
        let relation = self
            .storage
            .open_relation(name, column_names, column_attributes);
        self.cache
            .lock()
            .insert(name.to_string(), relation.clone());
        Ok(relation)
    }

    /// Reads a user table's schema from `_columns`, in scan order.
    fn read_schema(
        &self,
        name: &str,
    ) -> Result<(Vec<Identifier>, Vec<DataType>), CatalogError> {
        let predicate = Row::from([(
            "table_name".to_string(),
            Value::Text(name.to_string()),
        )]);
        let columns = self.columns.lock();
        let handles = columns.select(Some(&predicate))?;
        if handles.is_empty() {
            return Err(CatalogError::TableNotFound {
                name: name.to_string(),
            });
        }
        let wanted = ["column_name".to_string(), "data_type".to_string()];
        let mut column_names = Vec::with_capacity(handles.len());
        let mut column_attributes = Vec::with_capacity(handles.len());
        for handle in handles {
            let row = columns.project(handle, &wanted)?;
            column_names.push(schema::text_value(&row, "column_name")?);
            let type_name = schema::text_value(&row, "data_type")?;
            column_attributes.push(DataType::from_type_name(&type_name).ok_or(
                CatalogError::UnknownDataType { name: type_name },
            )?);
        }
        Ok((column_names, column_attributes))
    }

    /// Drops the cached relation handle for `name`, if any.
    ///
    /// Must run before a dropped name is reused (DROP TABLE, DDL rollback).
    pub fn evict(&self, name: &str) {
        self.cache.lock().remove(name);
    }
}
