//! The self-describing system catalog.
//!
//! Schema state lives in three meta-relations stored by the same storage
//! engine as user data:
//!
//! - `_tables` — one row per relation (including the meta-relations themselves)
//! - `_columns` — one row per column of every relation
//! - `_indices` — one row per (index, column) pair
//!
//! [`Tables`] and [`Indices`] wrap those relations and keep name-keyed
//! caches of open [`RelationRef`](crate::storage::RelationRef) /
//! [`IndexRef`](crate::storage::IndexRef) handles. The catalog rows are
//! authoritative for existence; the caches are authoritative for open
//! objects and must be evicted before a dropped name is reused.

pub mod error;
pub mod indices;
pub mod schema;
pub mod tables;

use std::sync::Arc;

use crate::datum::{Row, Value};
use crate::storage::{Relation, StorageEngine};

pub use error::CatalogError;
pub use indices::Indices;
pub use schema::{
    is_schema_table, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME, TABLES_TABLE_NAME,
};
pub use tables::Tables;

/// Opens the three meta-relations and returns the catalog pair.
///
/// On a fresh store this seeds `_tables` with its three self-rows and
/// `_columns` with the rows describing all three meta-relation schemas, so
/// the catalog describes itself from the first statement on.
pub fn bootstrap(storage: Arc<dyn StorageEngine>) -> Result<(Tables, Indices), CatalogError> {
    let (names, attributes) = schema::tables_schema();
    let tables_rel = storage.open_relation(TABLES_TABLE_NAME, names, attributes);
    tables_rel.lock().create_if_not_exists()?;

    let (names, attributes) = schema::columns_schema();
    let columns_rel = storage.open_relation(COLUMNS_TABLE_NAME, names, attributes);
    columns_rel.lock().create_if_not_exists()?;

    let (names, attributes) = schema::indices_schema();
    let indices_rel = storage.open_relation(INDICES_TABLE_NAME, names, attributes);
    indices_rel.lock().create_if_not_exists()?;

    let tables = Tables::new(
        tables_rel.clone(),
        columns_rel.clone(),
        indices_rel.clone(),
        storage.clone(),
    );
    let indices = Indices::new(indices_rel, storage);

    if tables.select(None)?.is_empty() {
        for meta in [TABLES_TABLE_NAME, COLUMNS_TABLE_NAME, INDICES_TABLE_NAME] {
            let row = Row::from([("table_name".to_string(), Value::Text(meta.to_string()))]);
            tables.insert(&row)?;
        }
        let mut columns_rel = columns_rel.lock();
        for (table, column, data_type) in schema::bootstrap_columns() {
            let row = Row::from([
                ("table_name".to_string(), Value::Text(table.to_string())),
                ("column_name".to_string(), Value::Text(column.to_string())),
                ("data_type".to_string(), Value::Text(data_type.to_string())),
            ]);
            columns_rel.insert(&row)?;
        }
    }

    Ok((tables, indices))
}
