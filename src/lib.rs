pub mod config;
pub mod dataset;
pub mod document;
pub mod error;
pub mod expand;
pub mod extract;
pub mod folds;
pub mod graph;
pub mod ingest;
pub mod pipeline;
pub mod text;

pub use config::Config;
pub use dataset::DatasetRow;
pub use document::{Document, Element};
pub use error::{LexfoldError, Result};
pub use extract::Triple;
pub use folds::{compute_folds, expand_to_rows, splits, FoldAssignment};
pub use graph::RelationGraph;
pub use pipeline::preprocess;
