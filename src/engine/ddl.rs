//! DDL executors: CREATE/DROP TABLE and CREATE/DROP INDEX.
//!
//! A DDL statement touches several catalog relations plus one physical
//! object, in a fixed order. On failure partway through, the executors
//! undo the catalog inserts made so far in reverse order, best-effort:
//! rollback failures are swallowed and the original error is returned.

use tracing::info;

use super::error::ExecutorError;
use super::result::QueryResult;
use super::Engine;
use crate::catalog::{is_schema_table, COLUMNS_TABLE_NAME};
use crate::datum::{DataType, Identifier, Row, Value};
use crate::sql::{ColumnType, CreateIndexStmt, CreateTableStmt, DropIndexStmt, DropTableStmt};
use crate::storage::{Index, Relation};

impl Engine {
    /// CREATE TABLE: register the table in `_tables` and its columns in
    /// `_columns`, then create the physical relation.
    pub(super) fn create_table(
        &self,
        stmt: &CreateTableStmt,
    ) -> Result<QueryResult, ExecutorError> {
        let mut column_names = Vec::with_capacity(stmt.columns.len());
        let mut column_attributes = Vec::with_capacity(stmt.columns.len());
        for column in &stmt.columns {
            let attribute = match column.column_type {
                ColumnType::Int => DataType::Int,
                ColumnType::Text => DataType::Text,
                ColumnType::Double => return Err(ExecutorError::UnrecognizedDataType),
            };
            column_names.push(column.name.clone());
            column_attributes.push(attribute);
        }

        let table_row = Row::from([(
            "table_name".to_string(),
            Value::Text(stmt.table.clone()),
        )]);

        // IF NOT EXISTS on a registered table: leave the catalog exactly
        // as it is, only making sure the physical relation is present.
        if stmt.if_not_exists && !self.tables.select(Some(&table_row))?.is_empty() {
            let table = self.tables.get_table(&stmt.table)?;
            table.lock().create_if_not_exists()?;
            return Ok(QueryResult::Message(format!("created {}", stmt.table)));
        }

        let table_handle = self.tables.insert(&table_row)?;
        if let Err(e) = self.register_columns_and_create(stmt, &column_names, &column_attributes)
        {
            // Undo the _tables insert; the original error wins.
            let _ = self.tables.del(table_handle);
            return Err(e);
        }

        info!(table = %stmt.table, "created table");
        Ok(QueryResult::Message(format!("created {}", stmt.table)))
    }

    /// Registers the `_columns` rows and creates the physical relation,
    /// undoing the `_columns` inserts if either part fails.
    fn register_columns_and_create(
        &self,
        stmt: &CreateTableStmt,
        column_names: &[Identifier],
        column_attributes: &[DataType],
    ) -> Result<(), ExecutorError> {
        let columns = self.tables.get_table(COLUMNS_TABLE_NAME)?;
        let mut column_handles = Vec::with_capacity(column_names.len());
        let result = (|| -> Result<(), ExecutorError> {
            for (name, attribute) in column_names.iter().zip(column_attributes) {
                let row = Row::from([
                    ("table_name".to_string(), Value::Text(stmt.table.clone())),
                    ("column_name".to_string(), Value::Text(name.clone())),
                    (
                        "data_type".to_string(),
                        Value::Text(attribute.type_name().to_string()),
                    ),
                ]);
                column_handles.push(columns.lock().insert(&row)?);
            }

            // The catalog now describes the table; create it physically.
            let table = self.tables.get_table(&stmt.table)?;
            let mut table = table.lock();
            if stmt.if_not_exists {
                table.create_if_not_exists()?;
            } else {
                table.create()?;
            }
            Ok(())
        })();

        if let Err(e) = result {
            for handle in column_handles.iter().rev() {
                let _ = columns.lock().del(*handle);
            }
            self.tables.evict(&stmt.table);
            return Err(e);
        }
        Ok(())
    }

    /// CREATE INDEX: register one `_indices` row per indexed column, then
    /// create the physical index.
    pub(super) fn create_index(
        &self,
        stmt: &CreateIndexStmt,
    ) -> Result<QueryResult, ExecutorError> {
        let table = self.tables.get_table(&stmt.table)?;
        {
            let table = table.lock();
            for column in &stmt.columns {
                if !table.column_names().contains(column) {
                    return Err(ExecutorError::ColumnNotInTable {
                        column: column.clone(),
                        table: stmt.table.clone(),
                    });
                }
            }
        }

        let mut index_handles = Vec::with_capacity(stmt.columns.len());
        let result = (|| -> Result<(), ExecutorError> {
            for (seq, column) in stmt.columns.iter().enumerate() {
                let row = Row::from([
                    ("table_name".to_string(), Value::Text(stmt.table.clone())),
                    ("index_name".to_string(), Value::Text(stmt.index.clone())),
                    ("seq_in_index".to_string(), Value::Int(seq as i32 + 1)),
                    ("column_name".to_string(), Value::Text(column.clone())),
                    (
                        "index_type".to_string(),
                        Value::Text(stmt.index_type.type_name().to_string()),
                    ),
                    (
                        "is_unique".to_string(),
                        Value::Bool(stmt.index_type.is_unique()),
                    ),
                ]);
                index_handles.push(self.indices.insert(&row)?);
            }

            let index = self.indices.get_index(&stmt.table, &stmt.index)?;
            index.lock().create()?;
            Ok(())
        })();

        if let Err(e) = result {
            for handle in index_handles.iter().rev() {
                let _ = self.indices.del(*handle);
            }
            self.indices.evict(&stmt.table, &stmt.index);
            return Err(e);
        }

        info!(table = %stmt.table, index = %stmt.index, "created index");
        Ok(QueryResult::Message(format!("created index {}", stmt.index)))
    }

    /// DROP TABLE: drop every index on the table, then unwind the catalog
    /// rows and the physical relation.
    pub(super) fn drop_table(&self, stmt: &DropTableStmt) -> Result<QueryResult, ExecutorError> {
        if is_schema_table(&stmt.table) {
            return Err(ExecutorError::DropSchemaTable);
        }
        let table = self.tables.get_table(&stmt.table)?;
        let predicate = Row::from([(
            "table_name".to_string(),
            Value::Text(stmt.table.clone()),
        )]);

        for index_name in self.indices.get_index_names(&stmt.table)? {
            let index = self.indices.get_index(&stmt.table, &index_name)?;
            Index::drop(&mut *index.lock())?;
        }
        self.indices.evict_table(&stmt.table);
        for handle in self.indices.select(Some(&predicate))? {
            self.indices.del(handle)?;
        }

        let columns = self.tables.get_table(COLUMNS_TABLE_NAME)?;
        {
            let mut columns = columns.lock();
            for handle in columns.select(Some(&predicate))? {
                columns.del(handle)?;
            }
        }

        Relation::drop(&mut *table.lock())?;
        self.tables.evict(&stmt.table);

        for handle in self.tables.select(Some(&predicate))? {
            self.tables.del(handle)?;
        }

        info!(table = %stmt.table, "dropped table");
        Ok(QueryResult::Message(format!("dropped {}", stmt.table)))
    }

    /// DROP INDEX: drop the physical index and delete its `_indices` rows.
    pub(super) fn drop_index(&self, stmt: &DropIndexStmt) -> Result<QueryResult, ExecutorError> {
        let index = self.indices.get_index(&stmt.table, &stmt.index)?;
        Index::drop(&mut *index.lock())?;
        self.indices.evict(&stmt.table, &stmt.index);

        let predicate = Row::from([
            ("table_name".to_string(), Value::Text(stmt.table.clone())),
            ("index_name".to_string(), Value::Text(stmt.index.clone())),
        ]);
        for handle in self.indices.select(Some(&predicate))? {
            self.indices.del(handle)?;
        }

        info!(table = %stmt.table, index = %stmt.index, "dropped index");
        Ok(QueryResult::Message(format!("dropped index {}", stmt.index)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{INDICES_TABLE_NAME, TABLES_TABLE_NAME};
    use crate::sql::{ColumnDefinition, IndexType};
    use crate::storage::MemoryEngine;

    fn engine() -> Engine {
        Engine::new(Arc::new(MemoryEngine::new())).unwrap()
    }

    fn foo_stmt(if_not_exists: bool) -> CreateTableStmt {
        CreateTableStmt {
            table: "foo".to_string(),
            columns: vec![
                ColumnDefinition {
                    name: "id".to_string(),
                    column_type: ColumnType::Int,
                },
                ColumnDefinition {
                    name: "name".to_string(),
                    column_type: ColumnType::Text,
                },
            ],
            if_not_exists,
        }
    }

    fn fx_stmt() -> CreateIndexStmt {
        CreateIndexStmt {
            index: "fx".to_string(),
            table: "foo".to_string(),
            index_type: IndexType::BTree,
            columns: vec!["id".to_string()],
        }
    }

    fn count(engine: &Engine, meta: &str, table: &str) -> usize {
        let predicate =
            Row::from([("table_name".to_string(), Value::Text(table.to_string()))]);
        let relation = engine.tables.get_table(meta).unwrap();
        let handles = relation.lock().select(Some(&predicate)).unwrap();
        handles.len()
    }

    #[test]
    fn test_create_table() {
        let engine = engine();
        let result = engine.create_table(&foo_stmt(false)).unwrap();
        assert_eq!(result.message(), "created foo");
        assert_eq!(count(&engine, TABLES_TABLE_NAME, "foo"), 1);
        assert_eq!(count(&engine, COLUMNS_TABLE_NAME, "foo"), 2);
    }

    #[test]
    fn test_create_table_rejects_double() {
        let engine = engine();
        let stmt = CreateTableStmt {
            table: "foo".to_string(),
            columns: vec![ColumnDefinition {
                name: "x".to_string(),
                column_type: ColumnType::Double,
            }],
            if_not_exists: false,
        };
        assert!(matches!(
            engine.create_table(&stmt),
            Err(ExecutorError::UnrecognizedDataType)
        ));
        assert_eq!(count(&engine, TABLES_TABLE_NAME, "foo"), 0);
    }

    #[test]
    fn test_create_table_rollback_leaves_catalog_unchanged() {
        let engine = engine();
        engine.create_table(&foo_stmt(false)).unwrap();

        // Second create fails at the physical step; catalog row counts
        // must be exactly as before.
        let err = engine.create_table(&foo_stmt(false)).unwrap_err();
        assert!(matches!(err, ExecutorError::Storage(_)));
        assert_eq!(count(&engine, TABLES_TABLE_NAME, "foo"), 1);
        assert_eq!(count(&engine, COLUMNS_TABLE_NAME, "foo"), 2);
    }

    #[test]
    fn test_create_table_if_not_exists_is_idempotent() {
        let engine = engine();
        engine.create_table(&foo_stmt(true)).unwrap();
        let before_tables = count(&engine, TABLES_TABLE_NAME, "foo");
        let before_columns = count(&engine, COLUMNS_TABLE_NAME, "foo");

        let result = engine.create_table(&foo_stmt(true)).unwrap();
        assert_eq!(result.message(), "created foo");
        assert_eq!(count(&engine, TABLES_TABLE_NAME, "foo"), before_tables);
        assert_eq!(count(&engine, COLUMNS_TABLE_NAME, "foo"), before_columns);
    }

    #[test]
    fn test_create_index() {
        let engine = engine();
        engine.create_table(&foo_stmt(false)).unwrap();
        let result = engine.create_index(&fx_stmt()).unwrap();
        assert_eq!(result.message(), "created index fx");
        assert_eq!(count(&engine, INDICES_TABLE_NAME, "foo"), 1);
    }

    #[test]
    fn test_create_index_unknown_column() {
        let engine = engine();
        engine.create_table(&foo_stmt(false)).unwrap();
        let stmt = CreateIndexStmt {
            index: "fx".to_string(),
            table: "foo".to_string(),
            index_type: IndexType::BTree,
            columns: vec!["missing".to_string()],
        };
        let err = engine.create_index(&stmt).unwrap_err();
        assert_eq!(err.to_string(), "Column 'missing' does not exist in foo");
        assert_eq!(count(&engine, INDICES_TABLE_NAME, "foo"), 0);
    }

    #[test]
    fn test_create_index_rollback_leaves_catalog_unchanged() {
        let engine = engine();
        engine.create_table(&foo_stmt(false)).unwrap();
        engine.create_index(&fx_stmt()).unwrap();

        // Second create fails at the physical step and must roll back the
        // freshly inserted _indices rows.
        let err = engine.create_index(&fx_stmt()).unwrap_err();
        assert!(matches!(err, ExecutorError::Storage(_)));
        assert_eq!(count(&engine, INDICES_TABLE_NAME, "foo"), 1);
    }

    #[test]
    fn test_drop_table_refuses_schema_tables() {
        let engine = engine();
        for table in ["_tables", "_columns", "_indices"] {
            let err = engine
                .drop_table(&DropTableStmt {
                    table: table.to_string(),
                })
                .unwrap_err();
            assert!(matches!(err, ExecutorError::DropSchemaTable));
        }
        // No catalog mutation happened.
        assert_eq!(engine.tables.select(None).unwrap().len(), 3);
    }

    #[test]
    fn test_drop_table_unwinds_everything() {
        let engine = engine();
        engine.create_table(&foo_stmt(false)).unwrap();
        engine.create_index(&fx_stmt()).unwrap();

        let result = engine
            .drop_table(&DropTableStmt {
                table: "foo".to_string(),
            })
            .unwrap();
        assert_eq!(result.message(), "dropped foo");
        assert_eq!(count(&engine, TABLES_TABLE_NAME, "foo"), 0);
        assert_eq!(count(&engine, COLUMNS_TABLE_NAME, "foo"), 0);
        assert_eq!(count(&engine, INDICES_TABLE_NAME, "foo"), 0);
        assert!(engine.tables.get_table("foo").is_err());

        // The name is reusable immediately.
        engine.create_table(&foo_stmt(false)).unwrap();
    }

    #[test]
    fn test_drop_index() {
        let engine = engine();
        engine.create_table(&foo_stmt(false)).unwrap();
        engine.create_index(&fx_stmt()).unwrap();

        let result = engine
            .drop_index(&DropIndexStmt {
                table: "foo".to_string(),
                index: "fx".to_string(),
            })
            .unwrap();
        assert_eq!(result.message(), "dropped index fx");
        assert_eq!(count(&engine, INDICES_TABLE_NAME, "foo"), 0);
        assert!(engine.indices.get_index("foo", "fx").is_err());

        // The index name is reusable immediately.
        engine.create_index(&fx_stmt()).unwrap();
    }

    #[test]
    fn test_drop_unknown_table() {
        let engine = engine();
        assert!(matches!(
            engine.drop_table(&DropTableStmt {
                table: "nope".to_string()
            }),
            Err(ExecutorError::Catalog(_))
        ));
    }
}
