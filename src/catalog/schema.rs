//! Meta-relation names, schemas, and catalog row decoding.

use crate::datum::{DataType, Identifier, Row, Value};

use super::error::CatalogError;

/// Name of the table-of-tables meta-relation.
pub const TABLES_TABLE_NAME: &str = "_tables";

/// Name of the column catalog meta-relation.
pub const COLUMNS_TABLE_NAME: &str = "_columns";

/// Name of the index catalog meta-relation.
pub const INDICES_TABLE_NAME: &str = "_indices";

/// Whether `name` is one of the three meta-relations.
pub fn is_schema_table(name: &str) -> bool {
    matches!(
        name,
        TABLES_TABLE_NAME | COLUMNS_TABLE_NAME | INDICES_TABLE_NAME
    )
}

/// Schema of `_tables`.
pub fn tables_schema() -> (Vec<Identifier>, Vec<DataType>) {
    (vec!["table_name".to_string()], vec![DataType::Text])
}

/// Schema of `_columns`.
pub fn columns_schema() -> (Vec<Identifier>, Vec<DataType>) {
    (
        vec![
            "table_name".to_string(),
            "column_name".to_string(),
            "data_type".to_string(),
        ],
        vec![DataType::Text, DataType::Text, DataType::Text],
    )
}

/// Schema of `_indices`.
pub fn indices_schema() -> (Vec<Identifier>, Vec<DataType>) {
    (
        vec![
            "table_name".to_string(),
            "index_name".to_string(),
            "seq_in_index".to_string(),
            "column_name".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ],
        vec![
            DataType::Text,
            DataType::Text,
            DataType::Int,
            DataType::Text,
            DataType::Text,
            DataType::Boolean,
        ],
    )
}

/// The `_columns` rows seeded at bootstrap: every column of every
/// meta-relation, `(table_name, column_name, data_type)`.
pub fn bootstrap_columns() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        (TABLES_TABLE_NAME, "table_name", "TEXT"),
        (COLUMNS_TABLE_NAME, "table_name", "TEXT"),
        (COLUMNS_TABLE_NAME, "column_name", "TEXT"),
        (COLUMNS_TABLE_NAME, "data_type", "TEXT"),
        (INDICES_TABLE_NAME, "table_name", "TEXT"),
        (INDICES_TABLE_NAME, "index_name", "TEXT"),
        (INDICES_TABLE_NAME, "seq_in_index", "INT"),
        (INDICES_TABLE_NAME, "column_name", "TEXT"),
        (INDICES_TABLE_NAME, "index_type", "TEXT"),
        (INDICES_TABLE_NAME, "is_unique", "BOOLEAN"),
    ]
}

/// Reads a TEXT column out of a catalog row.
pub(crate) fn text_value(row: &Row, column: &str) -> Result<String, CatalogError> {
    match row.get(column) {
        Some(Value::Text(s)) => Ok(s.clone()),
        other => Err(CatalogError::InvalidEntry(format!(
            "expected text in \"{}\", found {:?}",
            column, other
        ))),
    }
}

/// Reads an INT column out of a catalog row.
pub(crate) fn int_value(row: &Row, column: &str) -> Result<i32, CatalogError> {
    match row.get(column) {
        Some(Value::Int(n)) => Ok(*n),
        other => Err(CatalogError::InvalidEntry(format!(
            "expected int in \"{}\", found {:?}",
            column, other
        ))),
    }
}

/// Reads a BOOLEAN column out of a catalog row.
pub(crate) fn bool_value(row: &Row, column: &str) -> Result<bool, CatalogError> {
    match row.get(column) {
        Some(Value::Bool(b)) => Ok(*b),
        other => Err(CatalogError::InvalidEntry(format!(
            "expected boolean in \"{}\", found {:?}",
            column, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_table_names() {
        assert!(is_schema_table("_tables"));
        assert!(is_schema_table("_columns"));
        assert!(is_schema_table("_indices"));
        assert!(!is_schema_table("users"));
        assert!(!is_schema_table("_TABLES"));
    }

    #[test]
    fn test_bootstrap_columns_cover_all_schemas() {
        let rows = bootstrap_columns();
        assert_eq!(rows.len(), 10);
        let count = |t: &str| rows.iter().filter(|(table, _, _)| *table == t).count();
        assert_eq!(count(TABLES_TABLE_NAME), tables_schema().0.len());
        assert_eq!(count(COLUMNS_TABLE_NAME), columns_schema().0.len());
        assert_eq!(count(INDICES_TABLE_NAME), indices_schema().0.len());
    }

    #[test]
    fn test_row_decoding() {
        let row = Row::from([
            ("name".to_string(), Value::Text("t".to_string())),
            ("seq".to_string(), Value::Int(2)),
            ("unique".to_string(), Value::Bool(true)),
        ]);
        assert_eq!(text_value(&row, "name").unwrap(), "t");
        assert_eq!(int_value(&row, "seq").unwrap(), 2);
        assert!(bool_value(&row, "unique").unwrap());
        assert!(text_value(&row, "seq").is_err());
        assert!(int_value(&row, "missing").is_err());
    }
}
