//! DML executors: INSERT, DELETE, SELECT.

use tracing::debug;

use super::error::ExecutorError;
use super::plan::EvalPlan;
use super::predicate::where_conjunction;
use super::result::QueryResult;
use super::Engine;
use crate::datum::{DataType, Row, Value};
use crate::sql::{DeleteStmt, Expr, InsertStmt, Literal, SelectItem, SelectStmt};
use crate::storage::{Index, Relation};

impl Engine {
    /// INSERT: build a typed row from the statement's column/value pairs,
    /// insert it, and maintain every index on the table.
    pub(super) fn insert(&self, stmt: &InsertStmt) -> Result<QueryResult, ExecutorError> {
        if stmt.columns.len() != stmt.values.len() {
            return Err(ExecutorError::Unsupported(
                "INSERT column and value counts differ".to_string(),
            ));
        }
        let table = self.tables.get_table(&stmt.table)?;
        let (column_names, column_attributes) = {
            let table = table.lock();
            (
                table.column_names().to_vec(),
                table.column_attributes().to_vec(),
            )
        };

        // Columns may be listed in any order; pair each with its declared
        // attribute and check the literal kind against it.
        let mut row = Row::new();
        for (column, value) in stmt.columns.iter().zip(&stmt.values) {
            let position = column_names
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| ExecutorError::UnknownColumn {
                    column: column.clone(),
                })?;
            let value = match (column_attributes[position], value) {
                (DataType::Int, Expr::Literal(Literal::Int(n))) => Value::Int(*n as i32),
                (DataType::Text, Expr::Literal(Literal::String(s))) => Value::Text(s.clone()),
                _ => return Err(ExecutorError::InsertDataType),
            };
            row.insert(column.clone(), value);
        }

        let handle = table.lock().insert(&row)?;

        let index_names = self.indices.get_index_names(&stmt.table)?;
        for index_name in &index_names {
            let index = self.indices.get_index(&stmt.table, index_name)?;
            index.lock().insert(handle)?;
        }

        let mut message = format!("successfully inserted 1 row into {}", stmt.table);
        if !index_names.is_empty() {
            message.push_str(&format!(" and from {} indices", index_names.len()));
        }
        Ok(QueryResult::Message(message))
    }

    /// DELETE: pipeline the matching handles, then remove each from every
    /// index before removing it from the table.
    pub(super) fn delete(&self, stmt: &DeleteStmt) -> Result<QueryResult, ExecutorError> {
        let table = self.tables.get_table(&stmt.table)?;
        let mut plan = EvalPlan::TableScan {
            relation: table,
            predicate: None,
        };
        if let Some(expr) = &stmt.where_clause {
            plan = EvalPlan::Select {
                predicate: where_conjunction(expr)?,
                input: Box::new(plan),
            };
        }
        let plan = plan.optimize();
        debug!(plan = %plan.explain(), "delete plan");
        let (relation, handles) = plan.pipeline()?;

        let index_names = self.indices.get_index_names(&stmt.table)?;
        let mut rows = 0;
        let mut index_deletions = 0;
        for handle in handles {
            for index_name in &index_names {
                let index = self.indices.get_index(&stmt.table, index_name)?;
                index.lock().del(handle)?;
                index_deletions += 1;
            }
            relation.lock().del(handle)?;
            rows += 1;
        }

        Ok(QueryResult::Message(format!(
            "successfully deleted {} rows from {} {} indices",
            rows, stmt.table, index_deletions
        )))
    }

    /// SELECT: project over an optional select over a table scan.
    pub(super) fn select(&self, stmt: &SelectStmt) -> Result<QueryResult, ExecutorError> {
        let table = self.tables.get_table(&stmt.table)?;
        let (table_columns, table_attributes) = {
            let table = table.lock();
            (
                table.column_names().to_vec(),
                table.column_attributes().to_vec(),
            )
        };

        let mut plan = EvalPlan::TableScan {
            relation: table,
            predicate: None,
        };
        if let Some(expr) = &stmt.where_clause {
            plan = EvalPlan::Select {
                predicate: where_conjunction(expr)?,
                input: Box::new(plan),
            };
        }

        // `*` expands to the declaration order; explicit lists keep their
        // order. Attributes are resolved after expansion so the two lists
        // always stay parallel.
        let mut column_names = Vec::new();
        for item in &stmt.columns {
            match item {
                SelectItem::Wildcard => column_names.extend(table_columns.iter().cloned()),
                SelectItem::Column(name) => column_names.push(name.clone()),
            }
        }
        let mut column_attributes = Vec::with_capacity(column_names.len());
        for name in &column_names {
            let position = table_columns
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| ExecutorError::ColumnNotInTable {
                    column: name.clone(),
                    table: stmt.table.clone(),
                })?;
            column_attributes.push(table_attributes[position]);
        }

        let plan = EvalPlan::Project {
            columns: column_names.clone(),
            input: Box::new(plan),
        }
        .optimize();
        debug!(plan = %plan.explain(), "select plan");
        let rows = plan.evaluate()?;

        let message = format!("successfully returned {} rows", rows.len());
        Ok(QueryResult::Rows {
            column_names,
            column_attributes,
            rows,
            message,
        })
    }
}
