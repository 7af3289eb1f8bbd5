//! SHOW executors: TABLES, COLUMNS, INDEX.

use super::error::ExecutorError;
use super::result::QueryResult;
use super::Engine;
use crate::catalog::{is_schema_table, COLUMNS_TABLE_NAME};
use crate::datum::{DataType, Row, Value};
use crate::storage::Relation;

impl Engine {
    /// SHOW TABLES: every `_tables` row except the meta-relations.
    ///
    /// The reported count is the raw handle count minus the three
    /// self-rows, independent of the filter (historical behavior).
    pub(super) fn show_tables(&self) -> Result<QueryResult, ExecutorError> {
        let column_names = vec!["table_name".to_string()];
        let column_attributes = vec![DataType::Text];

        let handles = self.tables.select(None)?;
        let n = handles.len().saturating_sub(3);

        let mut rows = Vec::new();
        for handle in handles {
            let row = self.tables.project(handle, &column_names)?;
            let is_meta =
                matches!(row.get("table_name"), Some(Value::Text(name)) if is_schema_table(name));
            if !is_meta {
                rows.push(row);
            }
        }

        Ok(QueryResult::Rows {
            column_names,
            column_attributes,
            rows,
            message: format!("successfully returned {} rows", n),
        })
    }

    /// SHOW COLUMNS FROM table: the `_columns` rows for one table.
    pub(super) fn show_columns(&self, table: &str) -> Result<QueryResult, ExecutorError> {
        let column_names = vec![
            "table_name".to_string(),
            "column_name".to_string(),
            "data_type".to_string(),
        ];
        let column_attributes = vec![DataType::Text, DataType::Text, DataType::Text];

        let columns = self.tables.get_table(COLUMNS_TABLE_NAME)?;
        let columns = columns.lock();
        let predicate = Row::from([(
            "table_name".to_string(),
            Value::Text(table.to_string()),
        )]);
        let handles = columns.select(Some(&predicate))?;
        let n = handles.len();

        let mut rows = Vec::with_capacity(n);
        for handle in handles {
            rows.push(columns.project(handle, &column_names)?);
        }

        Ok(QueryResult::Rows {
            column_names,
            column_attributes,
            rows,
            message: format!("successfully returned {} rows", n),
        })
    }

    /// SHOW INDEX FROM table: the `_indices` rows for one table, all six
    /// columns.
    pub(super) fn show_index(&self, table: &str) -> Result<QueryResult, ExecutorError> {
        let column_names = vec![
            "table_name".to_string(),
            "index_name".to_string(),
            "column_name".to_string(),
            "seq_in_index".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ];
        let column_attributes = vec![
            DataType::Text,
            DataType::Text,
            DataType::Text,
            DataType::Int,
            DataType::Text,
            DataType::Boolean,
        ];

        let predicate = Row::from([(
            "table_name".to_string(),
            Value::Text(table.to_string()),
        )]);
        let handles = self.indices.select(Some(&predicate))?;
        let n = handles.len();

        let mut rows = Vec::with_capacity(n);
        for handle in handles {
            rows.push(self.indices.project(handle, &column_names)?);
        }

        Ok(QueryResult::Rows {
            column_names,
            column_attributes,
            rows,
            message: format!("successfully returned {} rows", n),
        })
    }
}
