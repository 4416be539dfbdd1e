//! Relation extraction: link attributes -> deduplicated triple set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::document::{Document, Element};

/// One directed edge record: `source --relation--> target`.
///
/// `Ord` makes the per-document triple set a `BTreeSet`, so iteration order
/// is deterministic regardless of traversal order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl Triple {
    pub fn new(source: &str, target: &str, relation: &str) -> Self {
        Triple {
            source: source.to_string(),
            target: target.to_string(),
            relation: relation.to_string(),
        }
    }
}

/// Extract the relation triple set of one document.
///
/// The fringe is seeded with every element carrying at least one configured
/// link attribute, in document order, and consumed as a stack. Link values
/// are split on the configured delimiter and resolved inside the grade
/// scope; ids that do not resolve there are skipped silently (they usually
/// reference another appeal instance).
///
/// An already-seen triple stops expansion through that edge: the target is
/// not pushed back onto the fringe. This is the termination guard for
/// cyclic references. Sibling edges of the same source are unaffected.
pub fn extract_relations(document: &Document, config: &ExtractionConfig) -> BTreeSet<Triple> {
    let scopes = document.grade_scopes(config);
    let mut triples: BTreeSet<Triple> = BTreeSet::new();

    let mut fringe: Vec<&Element> = document
        .iter()
        .filter(|el| config.relations.iter().any(|r| el.attr(r).is_some()))
        .collect();

    while let Some(element) = fringe.pop() {
        let source_id = match element.id(config) {
            Some(id) => id,
            // No id means no expressible edge; tolerated, not an error.
            None => continue,
        };

        for relation in &config.relations {
            let value = match element.attr(relation) {
                Some(v) => v,
                None => continue,
            };

            for target_id in value.split(config.link_delimiter.as_str()) {
                let target_id = target_id.trim();
                if target_id.is_empty() {
                    continue;
                }

                let target =
                    match Document::resolve_in_scope(&scopes, &config.id_attr, target_id) {
                        Some(el) => el,
                        None => {
                            log::debug!(
                                "Unresolved link {} -> {} ({}), skipping",
                                source_id,
                                target_id,
                                relation
                            );
                            continue;
                        }
                    };

                let triple = Triple::new(source_id, target_id, relation);
                if triples.contains(&triple) {
                    // Cycle guard: this edge was already produced, so the
                    // target is not expanded again through it.
                    continue;
                }
                triples.insert(triple);
                fringe.push(target);
            }
        }
    }

    triples
}
