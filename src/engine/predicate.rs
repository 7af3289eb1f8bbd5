//! WHERE-clause predicate extraction.
//!
//! The engine supports exactly one predicate shape: a conjunction of
//! equalities between a column and a literal, `c1 = v1 AND c2 = v2 AND …`.
//! Extraction turns that AST into a column → value map that the storage
//! layer can evaluate directly.

use super::error::ExecutorError;
use crate::datum::{Row, Value};
use crate::sql::{BinaryOperator, Expr, Literal};

/// Extracts an equality conjunction from a WHERE expression.
///
/// `AND` unions the maps of both sides; if the same column appears twice
/// with different values the later one wins (callers must not rely on it).
/// Any other operator, a non-column left side, or a non-literal right side
/// is an error.
pub fn where_conjunction(expr: &Expr) -> Result<Row, ExecutorError> {
    let Expr::BinaryOp { left, op, right } = expr else {
        return Err(ExecutorError::InvalidPredicate(
            "WHERE clause must be an operator expression".to_string(),
        ));
    };
    match op {
        BinaryOperator::And => {
            let mut conjunction = where_conjunction(left)?;
            conjunction.extend(where_conjunction(right)?);
            Ok(conjunction)
        }
        BinaryOperator::Eq => {
            let Expr::Column(column) = &**left else {
                return Err(ExecutorError::InvalidPredicate(
                    "left side of = must be a column".to_string(),
                ));
            };
            let value = match &**right {
                Expr::Literal(Literal::Int(n)) => Value::Int(*n as i32),
                Expr::Literal(Literal::String(s)) => Value::Text(s.clone()),
                other => {
                    return Err(ExecutorError::UnhandledLiteral(format!("{:?}", other)));
                }
            };
            Ok(Row::from([(column.clone(), value)]))
        }
        other => Err(ExecutorError::InvalidPredicate(format!(
            "unsupported operator {:?} in WHERE",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_equality() {
        let expr = Expr::eq("id", Literal::Int(7));
        let conjunction = where_conjunction(&expr).unwrap();
        assert_eq!(conjunction.len(), 1);
        assert_eq!(conjunction["id"], Value::Int(7));
    }

    #[test]
    fn test_string_equality() {
        let expr = Expr::eq("name", Literal::String("alice".to_string()));
        let conjunction = where_conjunction(&expr).unwrap();
        assert_eq!(conjunction["name"], Value::Text("alice".to_string()));
    }

    #[test]
    fn test_and_unions_both_sides() {
        let expr = Expr::and(
            Expr::eq("id", Literal::Int(1)),
            Expr::and(
                Expr::eq("name", Literal::String("a".to_string())),
                Expr::eq("other", Literal::Int(2)),
            ),
        );
        let conjunction = where_conjunction(&expr).unwrap();
        assert_eq!(conjunction.len(), 3);
        assert_eq!(conjunction["id"], Value::Int(1));
        assert_eq!(conjunction["other"], Value::Int(2));
    }

    #[test]
    fn test_duplicate_column_later_wins() {
        let expr = Expr::and(
            Expr::eq("id", Literal::Int(1)),
            Expr::eq("id", Literal::Int(2)),
        );
        let conjunction = where_conjunction(&expr).unwrap();
        assert_eq!(conjunction["id"], Value::Int(2));
    }

    #[test]
    fn test_rejects_non_operator() {
        assert!(matches!(
            where_conjunction(&Expr::Column("id".to_string())),
            Err(ExecutorError::InvalidPredicate(_))
        ));
        assert!(matches!(
            where_conjunction(&Expr::Literal(Literal::Int(1))),
            Err(ExecutorError::InvalidPredicate(_))
        ));
    }

    #[test]
    fn test_rejects_other_operators() {
        for op in [
            BinaryOperator::Or,
            BinaryOperator::NotEq,
            BinaryOperator::Lt,
            BinaryOperator::Gt,
        ] {
            let expr = Expr::BinaryOp {
                left: Box::new(Expr::Column("id".to_string())),
                op,
                right: Box::new(Expr::Literal(Literal::Int(1))),
            };
            assert!(matches!(
                where_conjunction(&expr),
                Err(ExecutorError::InvalidPredicate(_))
            ));
        }
    }

    #[test]
    fn test_rejects_float_literal() {
        let expr = Expr::eq("id", Literal::Float(1.5));
        assert!(matches!(
            where_conjunction(&expr),
            Err(ExecutorError::UnhandledLiteral(_))
        ));
    }

    #[test]
    fn test_rejects_non_column_left() {
        let expr = Expr::BinaryOp {
            left: Box::new(Expr::Literal(Literal::Int(1))),
            op: BinaryOperator::Eq,
            right: Box::new(Expr::Literal(Literal::Int(1))),
        };
        assert!(matches!(
            where_conjunction(&expr),
            Err(ExecutorError::InvalidPredicate(_))
        ));
    }

    #[test]
    fn test_rejects_column_right() {
        let expr = Expr::BinaryOp {
            left: Box::new(Expr::Column("a".to_string())),
            op: BinaryOperator::Eq,
            right: Box::new(Expr::Column("b".to_string())),
        };
        assert!(matches!(
            where_conjunction(&expr),
            Err(ExecutorError::UnhandledLiteral(_))
        ));
    }
}
