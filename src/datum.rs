//! Database data types and values.
//!
//! This module defines the canonical type system and value representation
//! for the engine. [`DataType`] is the declared type of a column, [`Value`]
//! is a single typed column value, and [`Row`] maps column names to values.
//! A row carries only the columns relevant at its use site: DML operations
//! carry the touched columns, projection carries the requested columns.

use std::collections::HashMap;
use std::fmt;

/// A column, table, or index name.
pub type Identifier = String;

/// A set of named column values.
///
/// Keys are unique; iteration order is unspecified. Callers that care about
/// column order (e.g. projection) keep their own ordered column list.
pub type Row = HashMap<Identifier, Value>;

/// Declared data type of a column.
///
/// `Boolean` appears only in catalog projections (the `is_unique` column of
/// `_indices`); CREATE TABLE accepts INT and TEXT only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit signed integer.
    Int,
    /// Variable-length string.
    Text,
    /// Boolean, catalog-internal.
    Boolean,
}

impl DataType {
    /// Returns the catalog spelling of this type (`"INT"`, `"TEXT"`, `"BOOLEAN"`).
    ///
    /// This is the string stored in the `data_type` column of `_columns`.
    pub const fn type_name(self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        }
    }

    /// Parses a catalog type name back into a [`DataType`].
    ///
    /// Returns `None` for anything other than the three catalog spellings.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "INT" => Some(DataType::Int),
            "TEXT" => Some(DataType::Text),
            "BOOLEAN" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed column value.
///
/// Equality is by variant and payload. The ordering derive gives index
/// implementations a total order over keys; no floating-point variant
/// exists, so `Eq`/`Ord` are sound.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// Variable-length text.
    Text(String),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
            Value::Bool(_) => DataType::Boolean,
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
