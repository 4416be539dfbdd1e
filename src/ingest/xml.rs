//! XML parser for case files: builds an owned [`Element`] tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{Document, Element};
use crate::error::{LexfoldError, Result};

/// Parse one XML document into an element tree.
///
/// Text content is accumulated per element verbatim; whitespace collapsing
/// happens later, at row-expansion time. `path` is only used in error
/// messages.
pub fn parse_document(content: &str, path: &str) -> Result<Document> {
    let mut reader = Reader::from_str(content);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(element_from_tag(&e, path)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_tag(&e, path)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = String::from_utf8_lossy(e.as_ref());
                    match current.text {
                        Some(ref mut existing) => existing.push_str(&text),
                        None => current.text = Some(text.to_string()),
                    }
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    LexfoldError::Parse(format!("Unbalanced closing tag in {}", path))
                })?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LexfoldError::Parse(format!(
                    "XML parse error in {}: {}",
                    path, e
                )));
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(LexfoldError::Parse(format!(
            "Unclosed element at end of {}",
            path
        )));
    }

    match root {
        Some(root) => Ok(Document::new(root)),
        None => Err(LexfoldError::Parse(format!("No root element in {}", path))),
    }
}

fn element_from_tag(start: &BytesStart<'_>, path: &str) -> Result<Element> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut element = Element::new(&tag);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            LexfoldError::Parse(format!("Bad attribute on <{}> in {}: {}", tag, path, e))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| {
                LexfoldError::Parse(format!("Bad attribute value on <{}> in {}: {}", tag, path, e))
            })?
            .to_string();
        element.attrs.insert(key, value);
    }

    Ok(element)
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
