//! End-to-end preprocessing: documents in, labeled dataset rows out.

use rayon::prelude::*;

use crate::config::Config;
use crate::dataset::DatasetRow;
use crate::document::Document;
use crate::expand::expand_rows;
use crate::extract::{extract_relations, filter_documents};
use crate::graph::RelationGraph;
use crate::text::TextNormalizer;
use crate::error::Result;

/// Run the full extraction pipeline.
///
/// Documents are filtered to those with a binary outcome, then each one is
/// expanded independently. Per-document work is sharded across the rayon
/// pool; the order-preserving collect keeps the output row sequence (and
/// every `document_index`) identical to a sequential run.
pub fn preprocess(documents: Vec<Document>, config: &Config) -> Result<Vec<DatasetRow>> {
    let normalizer =
        if config.text.stopwords_file.is_some() || config.text.lemmas_file.is_some() {
            Some(TextNormalizer::from_config(&config.text)?)
        } else {
            None
        };

    let documents = filter_documents(documents, &config.extraction);
    if documents.is_empty() {
        log::warn!("No documents with a binary outcome; dataset is empty");
        return Ok(Vec::new());
    }

    // Two-stage collect: per-document row vectors come back in document
    // order, then flatten sequentially, so the row sequence never depends
    // on scheduling.
    let per_document: Vec<Vec<DatasetRow>> = documents
        .par_iter()
        .enumerate()
        .map(|(index, document)| {
            let triples = extract_relations(document, &config.extraction);
            let graph = RelationGraph::from_triples(&triples);
            expand_rows(&graph, document, index, &config.extraction)
        })
        .collect();
    let mut rows: Vec<DatasetRow> = per_document.into_iter().flatten().collect();

    if let Some(normalizer) = &normalizer {
        normalize_rows(&mut rows, normalizer);
    }

    log::info!(
        "Preprocessing produced {} rows from {} documents",
        rows.len(),
        documents.len()
    );
    Ok(rows)
}

/// Apply text normalization to every text column of the dataset.
pub fn normalize_rows(rows: &mut [DatasetRow], normalizer: &TextNormalizer) {
    for row in rows {
        row.fact = normalizer.normalize(&row.fact);
        for value in row.tags.values_mut() {
            *value = normalizer.normalize(value);
        }
    }
}
