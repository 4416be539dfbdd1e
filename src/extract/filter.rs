//! Outcome pre-filter: keep only documents that can produce a labeled row.

use crate::config::ExtractionConfig;
use crate::document::Document;

/// Parse an outcome attribute value as a binary label.
///
/// Anything other than an integer equal to 0 or 1 (missing, non-numeric,
/// out of range) is `None`.
pub(crate) fn parse_outcome(value: Option<&str>) -> Option<u8> {
    match value?.trim().parse::<i64>().ok()? {
        0 => Some(0),
        1 => Some(1),
        _ => None,
    }
}

/// True when the document contains, inside the configured grade scope, at
/// least one decision element whose outcome attribute is binary.
pub fn has_binary_outcome(document: &Document, config: &ExtractionConfig) -> bool {
    document.grade_scopes(config).iter().any(|scope| {
        scope.iter().any(|el| {
            el.tag.starts_with(&config.decision_tag)
                && parse_outcome(el.attr(&config.outcome_attr)).is_some()
        })
    })
}

/// Drop documents that cannot yield any labeled row, before graph
/// extraction does any work on them.
pub fn filter_documents(documents: Vec<Document>, config: &ExtractionConfig) -> Vec<Document> {
    let total = documents.len();
    let kept: Vec<Document> = documents
        .into_iter()
        .filter(|doc| has_binary_outcome(doc, config))
        .collect();

    log::info!(
        "Outcome filter kept {}/{} documents with a binary outcome",
        kept.len(),
        total
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;

    fn decision(outcome: Option<&str>, grade: Option<&str>) -> Element {
        let mut el = Element::new("dec");
        el.attrs.insert("ID".to_string(), "d1".to_string());
        if let Some(outcome) = outcome {
            el.attrs.insert("E".to_string(), outcome.to_string());
        }
        if let Some(grade) = grade {
            el.attrs.insert("G".to_string(), grade.to_string());
        }
        el
    }

    fn document_of(children: Vec<Element>) -> Document {
        let mut root = Element::new("case");
        root.children = children;
        Document::new(root)
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::with_defaults(vec!["O".to_string()])
    }

    #[test]
    fn test_parse_outcome() {
        assert_eq!(parse_outcome(Some("0")), Some(0));
        assert_eq!(parse_outcome(Some("1")), Some(1));
        assert_eq!(parse_outcome(Some(" 1 ")), Some(1));
        assert_eq!(parse_outcome(Some("2")), None);
        assert_eq!(parse_outcome(Some("-1")), None);
        assert_eq!(parse_outcome(Some("upheld")), None);
        assert_eq!(parse_outcome(Some("")), None);
        assert_eq!(parse_outcome(None), None);
    }

    #[test]
    fn test_has_binary_outcome() {
        let doc = document_of(vec![decision(Some("1"), None)]);
        assert!(has_binary_outcome(&doc, &config()));

        let doc = document_of(vec![decision(Some("3"), None)]);
        assert!(!has_binary_outcome(&doc, &config()));

        let doc = document_of(vec![decision(None, None)]);
        assert!(!has_binary_outcome(&doc, &config()));
    }

    #[test]
    fn test_has_binary_outcome_respects_grade() {
        let doc = document_of(vec![decision(Some("1"), Some("1"))]);

        let mut config = config();
        config.grade = Some(2);
        assert!(!has_binary_outcome(&doc, &config));

        config.grade = Some(1);
        assert!(has_binary_outcome(&doc, &config));
    }

    #[test]
    fn test_filter_documents() {
        let documents = vec![
            document_of(vec![decision(Some("0"), None)]),
            document_of(vec![decision(Some("9"), None)]),
            document_of(vec![decision(Some("1"), None)]),
            document_of(vec![]),
        ];
        let kept = filter_documents(documents, &config());
        assert_eq!(kept.len(), 2);
    }
}
