//! Evaluation plans.
//!
//! An [`EvalPlan`] describes *what* to execute without touching any data.
//! SELECT and DELETE build one, run it through [`optimize`](EvalPlan::optimize),
//! and then execute it in one of two modes:
//!
//! - [`pipeline`](EvalPlan::pipeline) — produces the matching row handles
//!   plus the relation they belong to (DELETE, or any stage that wants
//!   handles rather than rows)
//! - [`evaluate`](EvalPlan::evaluate) — materializes projected rows (SELECT)
//!
//! The optimizer applies a single rewrite: a `Select` directly over a
//! `TableScan` collapses into a scan with a pushed predicate, so the
//! storage layer filters during the scan instead of the engine filtering
//! afterwards.

use super::error::ExecutorError;
use super::result::render_value;
use crate::datum::{Identifier, Row};
use crate::storage::{Handle, Relation, RelationRef};

/// A node in an evaluation plan tree.
pub enum EvalPlan {
    /// Leaf: all handles of a relation, optionally constrained by a pushed
    /// predicate.
    TableScan {
        /// The relation to scan.
        relation: RelationRef,
        /// Predicate pushed down by the optimizer.
        predicate: Option<Row>,
    },
    /// Filters the child's handle stream by an equality conjunction.
    Select {
        /// Column → required value.
        predicate: Row,
        /// Child plan.
        input: Box<EvalPlan>,
    },
    /// Materializes rows from the child's handles.
    Project {
        /// Output columns, in output order.
        columns: Vec<Identifier>,
        /// Child plan.
        input: Box<EvalPlan>,
    },
}

impl EvalPlan {
    /// Rewrites the plan, pushing predicates into scans.
    ///
    /// This is the entire optimizer: `Select(TableScan)` becomes
    /// `TableScan` with a pushed predicate. Other shapes are preserved.
    pub fn optimize(self) -> EvalPlan {
        match self {
            EvalPlan::Select { predicate, input } => match input.optimize() {
                EvalPlan::TableScan {
                    relation,
                    predicate: None,
                } => EvalPlan::TableScan {
                    relation,
                    predicate: Some(predicate),
                },
                optimized => EvalPlan::Select {
                    predicate,
                    input: Box::new(optimized),
                },
            },
            EvalPlan::Project { columns, input } => EvalPlan::Project {
                columns,
                input: Box::new(input.optimize()),
            },
            scan => scan,
        }
    }

    /// Executes the plan down to `(relation, handles)`.
    ///
    /// Handle order equals the scan order of the underlying relation and is
    /// stable for this execution only.
    pub fn pipeline(&self) -> Result<(RelationRef, Vec<Handle>), ExecutorError> {
        match self {
            EvalPlan::TableScan {
                relation,
                predicate,
            } => {
                let handles = relation.lock().select(predicate.as_ref())?;
                Ok((relation.clone(), handles))
            }
            EvalPlan::Select { predicate, input } => {
                let (relation, handles) = input.pipeline()?;
                let wanted: Vec<Identifier> = predicate.keys().cloned().collect();
                let mut matching = Vec::new();
                {
                    let relation = relation.lock();
                    for handle in handles {
                        if relation.project(handle, &wanted)? == *predicate {
                            matching.push(handle);
                        }
                    }
                }
                Ok((relation, matching))
            }
            EvalPlan::Project { input, .. } => input.pipeline(),
        }
    }

    /// Executes the plan down to materialized rows.
    ///
    /// Only a `Project` over a scan or select is evaluable; other shapes
    /// are an error.
    pub fn evaluate(&self) -> Result<Vec<Row>, ExecutorError> {
        match self {
            EvalPlan::Project { columns, input }
                if !matches!(**input, EvalPlan::Project { .. }) =>
            {
                let (relation, handles) = input.pipeline()?;
                let relation = relation.lock();
                handles
                    .into_iter()
                    .map(|handle| Ok(relation.project(handle, columns)?))
                    .collect()
            }
            _ => Err(ExecutorError::Unsupported(
                "plan shape cannot be evaluated".to_string(),
            )),
        }
    }

    /// Formats this plan as an indented operator tree.
    ///
    /// # Example output
    ///
    /// ```text
    /// Project: id, name
    ///   TableScan on foo (pushed: id = 1)
    /// ```
    pub fn explain(&self) -> String {
        self.format_explain(0)
    }

    fn format_explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            EvalPlan::TableScan {
                relation,
                predicate,
            } => {
                let name = relation.lock().name().to_string();
                match predicate {
                    Some(predicate) => format!(
                        "{}TableScan on {} (pushed: {})",
                        prefix,
                        name,
                        format_predicate(predicate)
                    ),
                    None => format!("{}TableScan on {}", prefix, name),
                }
            }
            EvalPlan::Select { predicate, input } => format!(
                "{}Select: {}\n{}",
                prefix,
                format_predicate(predicate),
                input.format_explain(indent + 1)
            ),
            EvalPlan::Project { columns, input } => format!(
                "{}Project: {}\n{}",
                prefix,
                columns.join(", "),
                input.format_explain(indent + 1)
            ),
        }
    }
}

/// Renders an equality conjunction with a stable column order.
fn format_predicate(predicate: &Row) -> String {
    let mut columns: Vec<&Identifier> = predicate.keys().collect();
    columns.sort();
    columns
        .iter()
        .map(|column| format!("{} = {}", column, render_value(&predicate[*column])))
        .collect::<Vec<_>>()
        .join(", ")
}
