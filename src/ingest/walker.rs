use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Discover XML case files under `root`.
///
/// Results are sorted by path so the document order (and therefore every
/// downstream index) is stable across runs and platforms. The corpus layout
/// keeps one instance per file directly inside the directory, so the default
/// is non-recursive; pass `recursive = true` to walk nested directories.
pub fn discover_xml_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("xml"))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();

    log::info!("Discovered {} XML files in {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_xml_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("b.xml"), "<case/>").unwrap();
        fs::write(root.join("a.xml"), "<case/>").unwrap();
        fs::write(root.join("notes.txt"), "not xml").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested/c.xml"), "<case/>").unwrap();

        let files = discover_xml_files(root, false).unwrap();
        assert_eq!(files.len(), 2);
        // Sorted: a.xml before b.xml; nested/c.xml excluded
        assert!(files[0].ends_with("a.xml"));
        assert!(files[1].ends_with("b.xml"));
    }

    #[test]
    fn test_discover_xml_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested/c.xml"), "<case/>").unwrap();

        let files = discover_xml_files(root, true).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("c.xml"));
    }

    #[test]
    fn test_discover_xml_files_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = discover_xml_files(temp_dir.path(), false).unwrap();
        assert!(files.is_empty());
    }
}
