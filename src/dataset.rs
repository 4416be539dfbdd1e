//! Flat dataset rows and their JSON Lines persistence.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One labeled training example.
///
/// Tag columns are configuration-driven, so they live in a flattened map
/// beside the fixed columns; serialized rows read as flat records
/// (`document_index, fact, <tag columns>, label`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    /// Index of the owning document in the filtered document sequence.
    pub document_index: usize,
    /// Text of the document-global fact element (may be empty).
    pub fact: String,
    /// One column per configured tag type.
    #[serde(flatten)]
    pub tags: BTreeMap<String, String>,
    /// Binary outcome: 0 or 1.
    pub label: u8,
}

/// Aggregate per-document (positive, negative) label counts over the
/// expanded rows. The vector spans `0..=max(document_index)`; documents
/// contributing no rows keep `(0, 0)`.
pub fn document_label_counts(rows: &[DatasetRow]) -> Vec<(u64, u64)> {
    let len = rows
        .iter()
        .map(|row| row.document_index + 1)
        .max()
        .unwrap_or(0);

    let mut counts = vec![(0u64, 0u64); len];
    for row in rows {
        let entry = &mut counts[row.document_index];
        if row.label == 1 {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
    counts
}

/// Write rows as JSON Lines.
pub fn write_jsonl<W: Write>(rows: &[DatasetRow], writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as a JSON Lines file.
pub fn write_jsonl_file(rows: &[DatasetRow], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_jsonl(rows, file)?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read rows back from JSON Lines. Blank lines are ignored.
pub fn read_jsonl<R: Read>(reader: R) -> Result<Vec<DatasetRow>> {
    let reader = BufReader::new(reader);
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}

/// Read rows from a JSON Lines file.
pub fn read_jsonl_file(path: &Path) -> Result<Vec<DatasetRow>> {
    let file = std::fs::File::open(path)?;
    read_jsonl(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(document_index: usize, label: u8) -> DatasetRow {
        let mut tags = BTreeMap::new();
        tags.insert("req".to_string(), "a request".to_string());
        DatasetRow {
            document_index,
            fact: "facts".to_string(),
            tags,
            label,
        }
    }

    #[test]
    fn test_document_label_counts() {
        let rows = vec![row(0, 1), row(0, 0), row(2, 1), row(2, 1)];
        let counts = document_label_counts(&rows);
        assert_eq!(counts, vec![(1, 1), (0, 0), (2, 0)]);
    }

    #[test]
    fn test_document_label_counts_empty() {
        assert!(document_label_counts(&[]).is_empty());
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let rows = vec![row(0, 1), row(1, 0)];
        let mut buffer = Vec::new();
        write_jsonl(&rows, &mut buffer).unwrap();

        let parsed = read_jsonl(buffer.as_slice()).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_jsonl_rows_are_flat_records() {
        let rows = vec![row(3, 1)];
        let mut buffer = Vec::new();
        write_jsonl(&rows, &mut buffer).unwrap();

        let line = String::from_utf8(buffer).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["document_index"], 3);
        assert_eq!(value["req"], "a request");
        assert_eq!(value["label"], 1);
    }

    #[test]
    fn test_jsonl_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dataset.jsonl");
        let rows = vec![row(0, 0), row(1, 1)];

        write_jsonl_file(&rows, &path).unwrap();
        let parsed = read_jsonl_file(&path).unwrap();
        assert_eq!(parsed, rows);
    }
}
