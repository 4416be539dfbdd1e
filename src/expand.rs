//! Component row expansion: relation-graph components -> dataset rows.

use std::collections::BTreeMap;

use crate::config::ExtractionConfig;
use crate::dataset::DatasetRow;
use crate::document::{Document, Element};
use crate::extract::filter::parse_outcome;
use crate::graph::RelationGraph;

/// Expand every qualifying connected component of a document's relation
/// graph into dataset rows.
///
/// A component qualifies when it contains a decision element (the anchor)
/// whose outcome attribute parses as 0 or 1; the first decision element in
/// document order is the anchor. Components without a usable anchor are
/// skipped silently.
///
/// Row multiplication: one row per individual request fragment. The request
/// column carries that fragment; every other tag column carries the joined
/// text of the whole component, so a component with N requests yields N rows
/// sharing label, fact, and context columns.
pub fn expand_rows(
    graph: &RelationGraph,
    document: &Document,
    document_index: usize,
    config: &ExtractionConfig,
) -> Vec<DatasetRow> {
    let index = document.id_index(config);
    let fact = document.fact_text(config);
    let mut rows = Vec::new();

    for mut component in graph.components() {
        // Members in document order; every iteration order below follows it.
        component.sort_by_key(|id| index.get(id).map(|(rank, _)| *rank).unwrap_or(usize::MAX));
        let members: Vec<&Element> = component
            .iter()
            .filter_map(|id| index.get(id).map(|(_, el)| *el))
            .collect();

        let anchor = match members
            .iter()
            .find(|el| el.tag.starts_with(&config.decision_tag))
        {
            Some(anchor) => anchor,
            None => {
                log::debug!(
                    "Component {:?} has no decision element, skipping",
                    component
                );
                continue;
            }
        };

        let label = match parse_outcome(anchor.attr(&config.outcome_attr)) {
            Some(label) => label,
            None => {
                log::debug!(
                    "Component anchored at {:?} has a non-binary outcome, skipping",
                    anchor.id(config)
                );
                continue;
            }
        };

        let mut joined: BTreeMap<String, String> = BTreeMap::new();
        let mut request_fragments: Vec<String> = Vec::new();
        for tag_type in &config.tag_types {
            let fragments = collect_fragments(&members, tag_type, config);
            if *tag_type == config.request_tag {
                request_fragments = fragments.clone();
            }
            joined.insert(tag_type.clone(), fragments.join(&config.join_token));
        }

        for fragment in &request_fragments {
            let mut tags = joined.clone();
            tags.insert(config.request_tag.clone(), fragment.clone());
            rows.push(DatasetRow {
                document_index,
                fact: fact.clone(),
                tags,
                label,
            });
        }
    }

    rows
}

/// Text fragments of the component members matching one tag-type prefix.
/// Subtree-gathering tag types concatenate descendant text; the rest use
/// the element's own text. Empty contributions are dropped.
fn collect_fragments(
    members: &[&Element],
    tag_type: &str,
    config: &ExtractionConfig,
) -> Vec<String> {
    let subtree = config.subtree_text_tags.iter().any(|t| t == tag_type);
    members
        .iter()
        .filter(|el| el.tag.starts_with(tag_type))
        .filter_map(|el| {
            if subtree {
                el.subtree_text()
            } else {
                el.own_text()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_relations;

    fn element(tag: &str, id: &str, text: Option<&str>) -> Element {
        let mut el = Element::new(tag);
        el.attrs.insert("ID".to_string(), id.to_string());
        el.text = text.map(str::to_string);
        el
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::with_defaults(vec!["O".to_string()])
    }

    fn expand(document: &Document, config: &ExtractionConfig) -> Vec<DatasetRow> {
        let triples = extract_relations(document, config);
        let graph = RelationGraph::from_triples(&triples);
        expand_rows(&graph, document, 0, config)
    }

    /// The worked single-document example: one decision linked to one
    /// request yields exactly one row with label 1.
    #[test]
    fn test_expand_single_component() {
        let mut dec = element("dec", "d1", None);
        dec.attrs.insert("E".to_string(), "1".to_string());
        dec.attrs.insert("G".to_string(), "2".to_string());
        dec.attrs.insert("O".to_string(), "r1".to_string());

        let mut root = Element::new("case");
        root.children
            .push(element("req", "r1", Some("refund requested")));
        root.children.push(dec);
        let doc = Document::new(root);

        let rows = expand(&doc, &config());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, 1);
        assert_eq!(rows[0].fact, "");
        assert_eq!(rows[0].tags["req"], "refund requested");
        assert_eq!(rows[0].tags["arg"], "");
        assert_eq!(rows[0].tags["claim"], "");
    }

    #[test]
    fn test_expand_row_multiplication() {
        // One decision bundling two requests: two rows, same label and
        // context, differing only in the request column.
        let mut dec = element("dec", "d1", None);
        dec.attrs.insert("E".to_string(), "0".to_string());
        dec.attrs.insert("O".to_string(), "r1|r2".to_string());

        let mut root = Element::new("case");
        root.children.push(element("fact", "f1", Some("the facts")));
        root.children.push(element("req", "r1", Some("first request")));
        root.children
            .push(element("req", "r2", Some("second request")));
        root.children.push(dec);
        let doc = Document::new(root);

        let rows = expand(&doc, &config());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tags["req"], "first request");
        assert_eq!(rows[1].tags["req"], "second request");
        for row in &rows {
            assert_eq!(row.label, 0);
            assert_eq!(row.fact, "the facts");
        }
    }

    #[test]
    fn test_expand_skips_component_without_decision() {
        let mut claim = element("claim", "c1", Some("a claim"));
        claim.attrs.insert("O".to_string(), "r1".to_string());

        let mut root = Element::new("case");
        root.children.push(element("req", "r1", Some("request")));
        root.children.push(claim);
        let doc = Document::new(root);

        assert!(expand(&doc, &config()).is_empty());
    }

    #[test]
    fn test_expand_skips_malformed_label() {
        for bad in ["2", "-1", "yes", ""] {
            let mut dec = element("dec", "d1", None);
            dec.attrs.insert("E".to_string(), bad.to_string());
            dec.attrs.insert("O".to_string(), "r1".to_string());

            let mut root = Element::new("case");
            root.children.push(element("req", "r1", Some("request")));
            root.children.push(dec);
            let doc = Document::new(root);

            assert!(expand(&doc, &config()).is_empty(), "label {:?}", bad);
        }
    }

    #[test]
    fn test_expand_subtree_text_gathering() {
        // "mot" is a subtree tag type: descendant text is concatenated.
        let mut mot = element("mot", "m1", Some("because"));
        mot.children
            .push(element("sub", "s1", Some(" the  law\tsays ")));
        let mut dec = element("dec", "d1", None);
        dec.attrs.insert("E".to_string(), "1".to_string());
        dec.attrs.insert("O".to_string(), "r1|m1".to_string());

        let mut root = Element::new("case");
        root.children.push(element("req", "r1", Some("request")));
        root.children.push(mot);
        root.children.push(dec);
        let doc = Document::new(root);

        let rows = expand(&doc, &config());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tags["mot"], "because the law says");
    }

    #[test]
    fn test_expand_joins_multiple_fragments() {
        let mut dec = element("dec", "d1", None);
        dec.attrs.insert("E".to_string(), "1".to_string());
        dec.attrs
            .insert("O".to_string(), "r1|c1|c2".to_string());

        let mut root = Element::new("case");
        root.children.push(element("req", "r1", Some("request")));
        root.children.push(element("claim", "c1", Some("first")));
        root.children.push(element("claim", "c2", Some("second")));
        root.children.push(dec);
        let doc = Document::new(root);

        let mut config = config();
        config.join_token = " | ".to_string();
        let rows = expand(&doc, &config);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tags["claim"], "first | second");
    }

    #[test]
    fn test_expand_two_independent_components() {
        let mut dec1 = element("dec", "d1", None);
        dec1.attrs.insert("E".to_string(), "1".to_string());
        dec1.attrs.insert("O".to_string(), "r1".to_string());
        let mut dec2 = element("dec", "d2", None);
        dec2.attrs.insert("E".to_string(), "0".to_string());
        dec2.attrs.insert("O".to_string(), "r2".to_string());

        let mut root = Element::new("case");
        root.children.push(element("req", "r1", Some("one")));
        root.children.push(element("req", "r2", Some("two")));
        root.children.push(dec1);
        root.children.push(dec2);
        let doc = Document::new(root);

        let mut rows = expand(&doc, &config());
        rows.sort_by(|a, b| a.tags["req"].cmp(&b.tags["req"]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tags["req"], "one");
        assert_eq!(rows[0].label, 1);
        assert_eq!(rows[1].tags["req"], "two");
        assert_eq!(rows[1].label, 0);
    }

    #[test]
    fn test_expand_labels_always_binary() {
        let mut dec = element("dec", "d1", None);
        dec.attrs.insert("E".to_string(), "1".to_string());
        dec.attrs.insert("O".to_string(), "r1".to_string());

        let mut root = Element::new("case");
        root.children.push(element("req", "r1", Some("request")));
        root.children.push(dec);
        let doc = Document::new(root);

        for row in expand(&doc, &config()) {
            assert!(row.label == 0 || row.label == 1);
        }
    }
}
