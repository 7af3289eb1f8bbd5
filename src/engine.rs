//! The SQL execution engine.
//!
//! [`Engine::execute`] takes a parsed [`Statement`] and returns a
//! [`QueryResult`], mutating catalog and storage state along the way.
//!
//! # Architecture
//!
//! - **Dispatch** (this module): statement kind → executor
//! - **Predicate extraction** ([`predicate`]): WHERE AST → equality conjunction
//! - **Evaluation plan** ([`plan`]): TableScan/Select/Project tree with a
//!   predicate-pushdown rewrite and pipeline/evaluate execution
//! - **DDL** ([`ddl`]): CREATE/DROP TABLE and INDEX with catalog rollback
//! - **DML** ([`dml`]): INSERT, DELETE, SELECT
//! - **SHOW** ([`show`]): TABLES, COLUMNS, INDEX over the catalog
//! - **Results** ([`result`]): message-only or tabular, with rendering
//!
//! Statement execution is synchronous and single-writer: the engine owns
//! the catalog pair and expects one statement at a time.

mod ddl;
mod dml;
mod error;
mod plan;
mod predicate;
mod result;
mod show;

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{self, Indices, Tables};
use crate::sql::{CreateStmt, DropStmt, ShowStmt, Statement};
use crate::storage::StorageEngine;

pub use error::ExecutorError;
pub use plan::EvalPlan;
pub use predicate::where_conjunction;
pub use result::QueryResult;

/// The execution engine: statement dispatch over a catalog context.
pub struct Engine {
    tables: Tables,
    indices: Indices,
}

impl Engine {
    /// Opens an engine over `storage`, bootstrapping the catalog if the
    /// store is fresh.
    pub fn new(storage: Arc<dyn StorageEngine>) -> Result<Self, ExecutorError> {
        let (tables, indices) = catalog::bootstrap(storage)?;
        Ok(Self { tables, indices })
    }

    /// Executes one statement.
    ///
    /// Statement kinds the engine does not implement return a message-only
    /// result rather than an error.
    pub fn execute(&self, statement: &Statement) -> Result<QueryResult, ExecutorError> {
        debug!(statement = ?statement, "executing");
        match statement {
            Statement::Create(CreateStmt::Table(stmt)) => self.create_table(stmt),
            Statement::Create(CreateStmt::Index(stmt)) => self.create_index(stmt),
            Statement::Create(CreateStmt::View { .. }) => Ok(QueryResult::Message(
                "Only CREATE TABLE and CREATE INDEX are implemented".to_string(),
            )),
            Statement::Drop(DropStmt::Table(stmt)) => self.drop_table(stmt),
            Statement::Drop(DropStmt::Index(stmt)) => self.drop_index(stmt),
            Statement::Drop(DropStmt::View { .. }) => Ok(QueryResult::Message(
                "Only DROP TABLE and DROP INDEX are implemented".to_string(),
            )),
            Statement::Insert(stmt) => self.insert(stmt),
            Statement::Delete(stmt) => self.delete(stmt),
            Statement::Select(stmt) => self.select(stmt),
            Statement::Show(ShowStmt::Tables) => self.show_tables(),
            Statement::Show(ShowStmt::Columns { table }) => self.show_columns(table),
            Statement::Show(ShowStmt::Index { table }) => self.show_index(table),
            Statement::Update(_) => Ok(QueryResult::Message("not implemented".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{Expr, UpdateStmt};
    use crate::storage::MemoryEngine;

    fn engine() -> Engine {
        Engine::new(Arc::new(MemoryEngine::new())).unwrap()
    }

    #[test]
    fn test_unimplemented_statements_are_messages() {
        let engine = engine();

        let result = engine
            .execute(&Statement::Update(UpdateStmt {
                table: "t".to_string(),
                assignments: vec![("a".to_string(), Expr::Column("b".to_string()))],
                where_clause: None,
            }))
            .unwrap();
        assert_eq!(result.message(), "not implemented");

        let result = engine
            .execute(&Statement::Create(CreateStmt::View {
                name: "v".to_string(),
            }))
            .unwrap();
        assert_eq!(
            result.message(),
            "Only CREATE TABLE and CREATE INDEX are implemented"
        );

        let result = engine
            .execute(&Statement::Drop(DropStmt::View {
                name: "v".to_string(),
            }))
            .unwrap();
        assert_eq!(
            result.message(),
            "Only DROP TABLE and DROP INDEX are implemented"
        );
    }
}
