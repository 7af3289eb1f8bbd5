//! Abstract Syntax Tree (AST) for SQL statements.
//!
//! This module defines the data structures that represent parsed SQL
//! statements. The AST is produced upstream (the parser is an external
//! collaborator) and consumed by [`Engine::execute`](crate::engine::Engine::execute).
//! Statement kinds the engine does not execute (`UPDATE`, `CREATE VIEW`,
//! `DROP VIEW`) are still representable so dispatch can answer them with a
//! message-only result.

use crate::datum::Identifier;

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE / CREATE INDEX / CREATE VIEW.
    Create(CreateStmt),
    /// DROP TABLE / DROP INDEX / DROP VIEW.
    Drop(DropStmt),
    /// INSERT statement.
    Insert(InsertStmt),
    /// DELETE statement.
    Delete(DeleteStmt),
    /// SELECT statement.
    Select(SelectStmt),
    /// SHOW statement.
    Show(ShowStmt),
    /// UPDATE statement (parsed but not executed).
    Update(UpdateStmt),
}

/// A CREATE statement, by object kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateStmt {
    /// CREATE TABLE.
    Table(CreateTableStmt),
    /// CREATE INDEX.
    Index(CreateIndexStmt),
    /// CREATE VIEW (not executed).
    View {
        /// View name.
        name: Identifier,
    },
}

/// A DROP statement, by object kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DropStmt {
    /// DROP TABLE.
    Table(DropTableStmt),
    /// DROP INDEX.
    Index(DropIndexStmt),
    /// DROP VIEW (not executed).
    View {
        /// View name.
        name: Identifier,
    },
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    /// Table name.
    pub table: Identifier,
    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDefinition>,
    /// Whether IF NOT EXISTS was given.
    pub if_not_exists: bool,
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: Identifier,
    /// Declared column type keyword.
    pub column_type: ColumnType,
}

/// Column type keywords the parser produces.
///
/// `Double` is parseable but the engine rejects it at CREATE TABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// INT.
    Int,
    /// TEXT.
    Text,
    /// DOUBLE.
    Double,
}

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    /// Index name.
    pub index: Identifier,
    /// Table the index is on.
    pub table: Identifier,
    /// Index structure (USING clause).
    pub index_type: IndexType,
    /// Indexed columns in given order.
    pub columns: Vec<Identifier>,
}

/// Index structure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// Ordered index; unique by construction.
    BTree,
    /// Hash index; non-unique by construction.
    Hash,
}

impl IndexType {
    /// Returns the catalog spelling (`"BTREE"`, `"HASH"`).
    pub const fn type_name(self) -> &'static str {
        match self {
            IndexType::BTree => "BTREE",
            IndexType::Hash => "HASH",
        }
    }

    /// Whether indices of this kind enforce key uniqueness.
    pub const fn is_unique(self) -> bool {
        matches!(self, IndexType::BTree)
    }

    /// Parses a catalog spelling back into an [`IndexType`].
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "BTREE" => Some(IndexType::BTree),
            "HASH" => Some(IndexType::Hash),
            _ => None,
        }
    }
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    /// Table to drop.
    pub table: Identifier,
}

/// DROP INDEX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStmt {
    /// Table the index is on.
    pub table: Identifier,
    /// Index to drop.
    pub index: Identifier,
}

/// INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    /// Target table.
    pub table: Identifier,
    /// Column list, which may be ordered differently from the table
    /// definition. Positionally paired with `values`.
    pub columns: Vec<Identifier>,
    /// Value expressions.
    pub values: Vec<Expr>,
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    /// Target table.
    pub table: Identifier,
    /// Optional WHERE clause.
    pub where_clause: Option<Expr>,
}

/// SELECT statement (single table, no joins).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Select list.
    pub columns: Vec<SelectItem>,
    /// FROM table.
    pub table: Identifier,
    /// Optional WHERE clause.
    pub where_clause: Option<Expr>,
}

/// An item in the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*` — all columns in declaration order.
    Wildcard,
    /// A named column.
    Column(Identifier),
}

/// SHOW statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowStmt {
    /// SHOW TABLES.
    Tables,
    /// SHOW COLUMNS FROM table.
    Columns {
        /// Table whose columns to list.
        table: Identifier,
    },
    /// SHOW INDEX FROM table.
    Index {
        /// Table whose indices to list.
        table: Identifier,
    },
}

/// UPDATE statement. Representable for dispatch; the engine does not
/// execute it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    /// Target table.
    pub table: Identifier,
    /// SET assignments.
    pub assignments: Vec<(Identifier, Expr)>,
    /// Optional WHERE clause.
    pub where_clause: Option<Expr>,
}

/// A scalar expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference.
    Column(Identifier),
    /// Literal value.
    Literal(Literal),
    /// Binary operation.
    BinaryOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
    },
}

/// A literal in the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Int(i64),
    /// String literal.
    String(String),
    /// Floating-point literal (no engine type accepts it).
    Float(f64),
}

/// Binary operators the parser produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `AND`.
    And,
    /// `OR`.
    Or,
    /// `=`.
    Eq,
    /// `<>`.
    NotEq,
    /// `<`.
    Lt,
    /// `>`.
    Gt,
}

impl Expr {
    /// Builds `column = literal`.
    pub fn eq(column: &str, literal: Literal) -> Expr {
        Expr::BinaryOp {
            left: Box::new(Expr::Column(column.to_string())),
            op: BinaryOperator::Eq,
            right: Box::new(Expr::Literal(literal)),
        }
    }

    /// Builds `left AND right`.
    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::And,
            right: Box::new(right),
        }
    }
}
