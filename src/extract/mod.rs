//! Relation extraction and outcome filtering.

pub mod filter;
pub mod relations;

pub use filter::{filter_documents, has_binary_outcome};
pub use relations::{extract_relations, Triple};
