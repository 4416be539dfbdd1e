//! Document loading: XML file discovery and tree parsing.

pub mod walker;
pub mod xml;

pub use walker::discover_xml_files;
pub use xml::parse_document;

use std::path::Path;

use crate::document::Document;
use crate::error::Result;

/// Load every XML case file of a directory, in stable path order.
///
/// Subdirectories are not explored. Malformed files surface as
/// [`crate::error::LexfoldError::Parse`]; everything after parsing tolerates
/// missing attributes, but the XML itself must be well formed.
pub fn load_directory(directory: &Path) -> Result<Vec<Document>> {
    let files = discover_xml_files(directory, false)?;

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let content = std::fs::read_to_string(&path)?;
        let mut document = parse_document(&content, &path.to_string_lossy())?;
        document.path = Some(path);
        documents.push(document);
    }

    log::info!(
        "Loaded {} documents from {}",
        documents.len(),
        directory.display()
    );
    Ok(documents)
}
