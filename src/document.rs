//! In-memory tree model for a parsed case document.
//!
//! A document is an ordered, attributed element tree. Elements carry a
//! unique id, optional free text, an optional appeal grade, and link
//! attributes whose values are delimiter-separated lists of other element
//! ids. Which attribute plays which role is decided by
//! [`crate::config::ExtractionConfig`], not by this module.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::ExtractionConfig;

/// A node in a case document tree.
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Tag name; its prefix determines the semantic role (req, claim, dec...).
    pub tag: String,
    /// All XML attributes, including id/grade/outcome/link attributes.
    pub attrs: BTreeMap<String, String>,
    /// Direct text content (child element text is not merged here).
    pub text: Option<String>,
    /// Ordered child elements.
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            ..Element::default()
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The element id under the configured id attribute, if present.
    pub fn id<'a>(&'a self, config: &ExtractionConfig) -> Option<&'a str> {
        self.attr(&config.id_attr)
    }

    /// The appeal grade, if present and numeric.
    pub fn grade(&self, grade_attr: &str) -> Option<i64> {
        self.attr(grade_attr).and_then(|v| v.trim().parse().ok())
    }

    /// Direct text with whitespace runs collapsed to single spaces.
    /// Returns `None` when the element has no usable text.
    pub fn own_text(&self) -> Option<String> {
        let collapsed = collapse_whitespace(self.text.as_deref()?);
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }

    /// Own text plus the text of every descendant, each collapsed, joined
    /// with single spaces, trimmed. Empty contributions are dropped.
    pub fn subtree_text(&self) -> Option<String> {
        let mut fragments = Vec::new();
        collect_subtree_text(self, &mut fragments);
        if fragments.is_empty() {
            None
        } else {
            Some(fragments.join(" "))
        }
    }

    /// Preorder (document order) iteration over this element and its
    /// descendants.
    pub fn iter(&self) -> PreorderIter<'_> {
        PreorderIter { stack: vec![self] }
    }
}

fn collect_subtree_text(element: &Element, fragments: &mut Vec<String>) {
    if let Some(text) = element.own_text() {
        fragments.push(text);
    }
    for child in &element.children {
        collect_subtree_text(child, fragments);
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Depth-first preorder iterator over an element tree.
pub struct PreorderIter<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for PreorderIter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        // Children pushed in reverse so the first child is visited next.
        for child in element.children.iter().rev() {
            self.stack.push(child);
        }
        Some(element)
    }
}

/// One parsed case file.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
    /// Source path, when the document came from disk.
    pub path: Option<PathBuf>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Document { root, path: None }
    }

    /// Preorder iteration over every element of the document.
    pub fn iter(&self) -> PreorderIter<'_> {
        self.root.iter()
    }

    /// Roots of the subtrees eligible for link resolution and outcome
    /// lookup. With no grade filter the whole document is one scope;
    /// otherwise every element whose grade attribute matches opens a scope
    /// (the element itself included).
    pub fn grade_scopes(&self, config: &ExtractionConfig) -> Vec<&Element> {
        match config.grade {
            None => vec![&self.root],
            Some(grade) => self
                .iter()
                .filter(|el| el.grade(&config.grade_attr) == Some(grade))
                .collect(),
        }
    }

    /// Resolve an element id inside the grade scope. Scopes are searched in
    /// document order; the first match wins. `None` is an expected outcome:
    /// ids referencing another appeal instance do not resolve here.
    pub fn resolve_in_scope<'a>(
        scopes: &[&'a Element],
        id_attr: &str,
        id: &str,
    ) -> Option<&'a Element> {
        for scope in scopes {
            for element in scope.iter() {
                if element.attr(id_attr) == Some(id) {
                    return Some(element);
                }
            }
        }
        None
    }

    /// Map from element id to (document-order rank, element). Later
    /// duplicates of an id are ignored, matching first-match resolution;
    /// duplicate ids are an upstream defect this code merely tolerates.
    pub fn id_index<'a>(
        &'a self,
        config: &ExtractionConfig,
    ) -> HashMap<&'a str, (usize, &'a Element)> {
        let mut index = HashMap::new();
        for (rank, element) in self.iter().enumerate() {
            if let Some(id) = element.id(config) {
                index.entry(id).or_insert((rank, element));
            }
        }
        index
    }

    /// Collapsed text of the document-global fact element, or empty string
    /// when absent. There is at most one such element per document; when the
    /// corpus carries more, the first in document order wins.
    pub fn fact_text(&self, config: &ExtractionConfig) -> String {
        self.iter()
            .find(|el| el.tag.starts_with(&config.fact_tag))
            .and_then(|el| el.own_text())
            .unwrap_or_default()
    }
}
