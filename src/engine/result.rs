//! Query results and their tabular rendering.

use std::fmt;

use crate::datum::{DataType, Identifier, Row, Value};

/// The result of executing one statement.
///
/// A statement either produces a bare message (DDL, DML) or a table of
/// rows with column metadata plus a trailing message (SELECT, SHOW). The
/// result owns its collections; they are freed when it is dropped.
#[derive(Debug, PartialEq)]
pub enum QueryResult {
    /// Message-only result.
    Message(String),
    /// Tabular result.
    Rows {
        /// Output column names, in output order.
        column_names: Vec<Identifier>,
        /// Output column attributes, parallel to `column_names`.
        column_attributes: Vec<DataType>,
        /// Result rows.
        rows: Vec<Row>,
        /// Trailing message.
        message: String,
    },
}

impl QueryResult {
    /// The result's message.
    pub fn message(&self) -> &str {
        match self {
            QueryResult::Message(message) => message,
            QueryResult::Rows { message, .. } => message,
        }
    }

    /// Output column names, if tabular.
    pub fn column_names(&self) -> Option<&[Identifier]> {
        match self {
            QueryResult::Message(_) => None,
            QueryResult::Rows { column_names, .. } => Some(column_names),
        }
    }

    /// Output column attributes, if tabular.
    pub fn column_attributes(&self) -> Option<&[DataType]> {
        match self {
            QueryResult::Message(_) => None,
            QueryResult::Rows {
                column_attributes, ..
            } => Some(column_attributes),
        }
    }

    /// Result rows, if tabular.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResult::Message(_) => None,
            QueryResult::Rows { rows, .. } => Some(rows),
        }
    }
}

/// Renders one cell value: INT as decimal, TEXT double-quoted, BOOLEAN as
/// `true`/`false`.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Text(s) => format!("\"{}\"", s),
        Value::Bool(b) => b.to_string(),
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let QueryResult::Rows {
            column_names, rows, ..
        } = self
        {
            for name in column_names {
                write!(f, "{} ", name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in rows {
                for name in column_names {
                    match row.get(name) {
                        Some(value) => write!(f, "{} ", render_value(value))?,
                        None => write!(f, "??? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message())
    }
}
