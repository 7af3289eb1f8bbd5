//! End-to-end statement execution over the in-memory storage engine.
//!
//! Drives [`Engine::execute`] through full DDL/DML/SHOW sequences and
//! checks the exact result messages and row contents.

use std::sync::Arc;

use minirel::datum::Value;
use minirel::engine::{Engine, QueryResult};
use minirel::sql::{
    ColumnDefinition, ColumnType, CreateIndexStmt, CreateStmt, CreateTableStmt, DeleteStmt,
    DropIndexStmt, DropStmt, DropTableStmt, Expr, IndexType, InsertStmt, Literal, SelectItem,
    SelectStmt, ShowStmt, Statement,
};
use minirel::storage::MemoryEngine;

fn engine() -> Engine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Engine::new(Arc::new(MemoryEngine::new())).unwrap()
}

fn create_table(table: &str, columns: &[(&str, ColumnType)], if_not_exists: bool) -> Statement {
    Statement::Create(CreateStmt::Table(CreateTableStmt {
        table: table.to_string(),
        columns: columns
            .iter()
            .map(|(name, column_type)| ColumnDefinition {
                name: name.to_string(),
                column_type: *column_type,
            })
            .collect(),
        if_not_exists,
    }))
}

fn create_index(index: &str, table: &str, index_type: IndexType, columns: &[&str]) -> Statement {
    Statement::Create(CreateStmt::Index(CreateIndexStmt {
        index: index.to_string(),
        table: table.to_string(),
        index_type,
        columns: columns.iter().map(|c| c.to_string()).collect(),
    }))
}

fn insert(table: &str, columns: &[&str], values: Vec<Expr>) -> Statement {
    Statement::Insert(InsertStmt {
        table: table.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

fn select_star(table: &str, where_clause: Option<Expr>) -> Statement {
    Statement::Select(SelectStmt {
        columns: vec![SelectItem::Wildcard],
        table: table.to_string(),
        where_clause,
    })
}

fn int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

fn text(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.to_string()))
}

/// Executes and returns the result, panicking with the statement on error.
fn run(engine: &Engine, statement: Statement) -> QueryResult {
    engine
        .execute(&statement)
        .unwrap_or_else(|e| panic!("{:?} failed: {}", statement, e))
}

#[test]
fn test_end_to_end_scenario() {
    let engine = engine();

    // 1. CREATE TABLE foo (id INT, name TEXT)
    let result = run(
        &engine,
        create_table("foo", &[("id", ColumnType::Int), ("name", ColumnType::Text)], false),
    );
    assert_eq!(result.message(), "created foo");

    // 2. SHOW TABLES
    let result = run(&engine, Statement::Show(ShowStmt::Tables));
    assert_eq!(result.message(), "successfully returned 1 rows");
    let rows = result.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["table_name"], Value::Text("foo".to_string()));

    // 3. INSERT INTO foo (id, name) VALUES (1, "alice")
    let result = run(
        &engine,
        insert("foo", &["id", "name"], vec![int(1), text("alice")]),
    );
    assert_eq!(result.message(), "successfully inserted 1 row into foo");

    // 4. CREATE INDEX fx ON foo USING BTREE (id)
    let result = run(&engine, create_index("fx", "foo", IndexType::BTree, &["id"]));
    assert_eq!(result.message(), "created index fx");

    let result = run(
        &engine,
        Statement::Show(ShowStmt::Index {
            table: "foo".to_string(),
        }),
    );
    let rows = result.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["seq_in_index"], Value::Int(1));
    assert_eq!(rows[0]["index_type"], Value::Text("BTREE".to_string()));
    assert_eq!(rows[0]["is_unique"], Value::Bool(true));

    // 5. INSERT INTO foo (id, name) VALUES (2, "bob")
    let result = run(
        &engine,
        insert("foo", &["id", "name"], vec![int(2), text("bob")]),
    );
    assert_eq!(
        result.message(),
        "successfully inserted 1 row into foo and from 1 indices"
    );

    // 6. DELETE FROM foo WHERE id = 1
    let result = run(
        &engine,
        Statement::Delete(DeleteStmt {
            table: "foo".to_string(),
            where_clause: Some(Expr::eq("id", Literal::Int(1))),
        }),
    );
    assert_eq!(
        result.message(),
        "successfully deleted 1 rows from foo 1 indices"
    );

    let result = run(&engine, select_star("foo", None));
    let rows = result.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], Value::Int(2));
    assert_eq!(rows[0]["name"], Value::Text("bob".to_string()));

    // 7. DROP TABLE foo
    let result = run(
        &engine,
        Statement::Drop(DropStmt::Table(DropTableStmt {
            table: "foo".to_string(),
        })),
    );
    assert_eq!(result.message(), "dropped foo");

    let result = run(&engine, Statement::Show(ShowStmt::Tables));
    assert_eq!(result.message(), "successfully returned 0 rows");
    assert!(result.rows().unwrap().is_empty());
}

#[test]
fn test_round_trip_reordered_insert() {
    let engine = engine();
    run(
        &engine,
        create_table("t", &[("a", ColumnType::Int), ("b", ColumnType::Text)], false),
    );
    run(&engine, insert("t", &["b", "a"], vec![text("x"), int(7)]));

    let result = run(&engine, select_star("t", None));
    assert_eq!(result.column_names().unwrap(), ["a", "b"]);
    let rows = result.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["a"], Value::Int(7));
    assert_eq!(rows[0]["b"], Value::Text("x".to_string()));
}

#[test]
fn test_create_if_not_exists_twice() {
    let engine = engine();
    let stmt = create_table("t", &[("a", ColumnType::Int)], true);
    assert_eq!(run(&engine, stmt.clone()).message(), "created t");
    assert_eq!(run(&engine, stmt).message(), "created t");

    // Catalog state is unchanged by the second call.
    let result = run(
        &engine,
        Statement::Show(ShowStmt::Columns {
            table: "t".to_string(),
        }),
    );
    assert_eq!(result.message(), "successfully returned 1 rows");
    let result = run(&engine, Statement::Show(ShowStmt::Tables));
    assert_eq!(result.rows().unwrap().len(), 1);
}

#[test]
fn test_select_where_and_pushdown_results_match() {
    let engine = engine();
    run(
        &engine,
        create_table("t", &[("a", ColumnType::Int), ("b", ColumnType::Text)], false),
    );
    for (a, b) in [(1, "x"), (2, "y"), (3, "x")] {
        run(&engine, insert("t", &["a", "b"], vec![int(a), text(b)]));
    }

    let result = run(
        &engine,
        select_star("t", Some(Expr::eq("b", Literal::String("x".to_string())))),
    );
    assert_eq!(result.message(), "successfully returned 2 rows");
    let rows = result.rows().unwrap();
    assert!(rows.iter().all(|row| row["b"] == Value::Text("x".to_string())));
}

#[test]
fn test_delete_from_dropped_index_table() {
    let engine = engine();
    run(
        &engine,
        create_table("t", &[("a", ColumnType::Int)], false),
    );
    run(&engine, create_index("ix", "t", IndexType::BTree, &["a"]));
    run(&engine, insert("t", &["a"], vec![int(1)]));
    run(
        &engine,
        Statement::Drop(DropStmt::Index(DropIndexStmt {
            table: "t".to_string(),
            index: "ix".to_string(),
        })),
    );

    // After DROP INDEX the delete touches zero indices.
    let result = run(
        &engine,
        Statement::Delete(DeleteStmt {
            table: "t".to_string(),
            where_clause: None,
        }),
    );
    assert_eq!(result.message(), "successfully deleted 1 rows from t 0 indices");
}

#[test]
fn test_select_renders_as_table() {
    let engine = engine();
    run(
        &engine,
        create_table("t", &[("a", ColumnType::Int), ("b", ColumnType::Text)], false),
    );
    run(&engine, insert("t", &["a", "b"], vec![int(7), text("x")]));

    let result = run(&engine, select_star("t", None));
    let expected = "a b \n\
                    +----------+----------+\n\
                    7 \"x\" \n\
                    successfully returned 1 rows";
    assert_eq!(result.to_string(), expected);
}

#[test]
fn test_meta_relations_are_selectable() {
    let engine = engine();
    run(
        &engine,
        create_table("t", &[("a", ColumnType::Int)], false),
    );

    // The catalog describes itself: its relations answer SELECT like any
    // other table.
    let result = run(
        &engine,
        Statement::Select(SelectStmt {
            columns: vec![SelectItem::Column("column_name".to_string())],
            table: "_columns".to_string(),
            where_clause: Some(Expr::eq("table_name", Literal::String("t".to_string()))),
        }),
    );
    assert_eq!(result.message(), "successfully returned 1 rows");
    assert_eq!(
        result.rows().unwrap()[0]["column_name"],
        Value::Text("a".to_string())
    );
}

#[test]
fn test_unique_index_rejects_duplicate_insert() {
    let engine = engine();
    run(
        &engine,
        create_table("t", &[("a", ColumnType::Int)], false),
    );
    run(&engine, create_index("ix", "t", IndexType::BTree, &["a"]));
    run(&engine, insert("t", &["a"], vec![int(1)]));

    let err = engine
        .execute(&insert("t", &["a"], vec![int(1)]))
        .unwrap_err();
    assert!(err.to_string().starts_with("DbRelationError: "));
}
