//! Storage contracts and the in-memory storage engine.
//!
//! The execution engine is decoupled from physical storage through three
//! contracts:
//!
//! - [`Relation`] — a named table of rows addressed by opaque [`Handle`]s
//! - [`Index`] — a named secondary index over a subset of a relation's columns
//! - [`StorageEngine`] — a factory that opens relations and indices by name
//!
//! [`MemoryEngine`] implements the contracts over process memory and backs
//! the catalog in tests. A page-based heap engine would implement the same
//! traits.

pub mod error;
pub mod memory;
pub mod relation;

pub use error::StorageError;
pub use memory::MemoryEngine;
pub use relation::{Handle, Index, IndexRef, Relation, RelationRef, StorageEngine};
