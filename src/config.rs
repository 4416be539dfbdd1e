use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub folds: FoldConfig,
    #[serde(default)]
    pub text: TextConfig,
}

/// Extraction pipeline configuration.
///
/// Attribute names are configurable because the corpus schema declares ids,
/// grades and outcomes through plain XML attributes; nothing is hardcoded
/// beyond the defaults matching the reference corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Link attribute names to follow when building the relation graph.
    pub relations: Vec<String>,
    /// Appeal instance (grade) used to scope link resolution and outcome
    /// lookup. `None` means the whole document is searched.
    #[serde(default)]
    pub grade: Option<i64>,
    /// Ordered tag-name prefixes that become dataset columns.
    #[serde(default = "default_tag_types")]
    pub tag_types: Vec<String>,
    /// Subset of `tag_types` whose text is gathered from the whole subtree.
    #[serde(default = "default_subtree_text_tags")]
    pub subtree_text_tags: Vec<String>,
    /// Tag prefix identifying decision (anchor) elements.
    #[serde(default = "default_decision_tag")]
    pub decision_tag: String,
    /// Tag prefix identifying request elements (row multiplication).
    #[serde(default = "default_request_tag")]
    pub request_tag: String,
    /// Tag of the document-global fact element.
    #[serde(default = "default_fact_tag")]
    pub fact_tag: String,
    /// Attribute holding the element identifier.
    #[serde(default = "default_id_attr")]
    pub id_attr: String,
    /// Attribute holding the appeal grade.
    #[serde(default = "default_grade_attr")]
    pub grade_attr: String,
    /// Attribute holding the binary outcome on decision elements.
    #[serde(default = "default_outcome_attr")]
    pub outcome_attr: String,
    /// Delimiter between target ids inside a link attribute value.
    #[serde(default = "default_link_delimiter")]
    pub link_delimiter: String,
    /// Token joining multiple text fragments of one tag column.
    #[serde(default = "default_join_token")]
    pub join_token: String,
}

/// Fold partitioner configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FoldConfig {
    #[serde(default = "default_num_folds")]
    pub num_folds: usize,
    /// Wall-clock budget for the solver, in seconds.
    #[serde(default = "default_time_budget_secs")]
    pub time_budget_secs: u64,
    /// Seed for the solver's local-search tie-breaks.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Optional text normalization configuration.
///
/// When both files are absent, dataset text is emitted as-is (whitespace
/// collapsed only).
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    #[serde(default)]
    pub stopwords_file: Option<PathBuf>,
    #[serde(default)]
    pub lemmas_file: Option<PathBuf>,
    /// Drop words missing from the lemma dictionary (instead of keeping them
    /// unchanged). Matches the stricter of the two reference pipelines.
    #[serde(default = "default_drop_unknown")]
    pub drop_unknown: bool,
}

fn default_tag_types() -> Vec<String> {
    ["req", "arg", "claim", "mot", "dec"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_subtree_text_tags() -> Vec<String> {
    ["mot", "dec"].iter().map(|s| s.to_string()).collect()
}

fn default_decision_tag() -> String {
    "dec".to_string()
}

fn default_request_tag() -> String {
    "req".to_string()
}

fn default_fact_tag() -> String {
    "fact".to_string()
}

fn default_id_attr() -> String {
    "ID".to_string()
}

fn default_grade_attr() -> String {
    "G".to_string()
}

fn default_outcome_attr() -> String {
    "E".to_string()
}

fn default_link_delimiter() -> String {
    "|".to_string()
}

fn default_join_token() -> String {
    " ".to_string()
}

fn default_num_folds() -> usize {
    5
}

fn default_time_budget_secs() -> u64 {
    30
}

fn default_seed() -> u64 {
    42
}

fn default_drop_unknown() -> bool {
    true
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            stopwords_file: None,
            lemmas_file: None,
            drop_unknown: default_drop_unknown(),
        }
    }
}

impl Default for FoldConfig {
    fn default() -> Self {
        FoldConfig {
            num_folds: default_num_folds(),
            time_budget_secs: default_time_budget_secs(),
            seed: default_seed(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// All prefix/role mappings are checked here, once, so per-element code
    /// never needs to re-validate attribute names.
    pub fn validate(&self) -> Result<()> {
        let ex = &self.extraction;

        if ex.relations.is_empty() {
            anyhow::bail!("extraction.relations must name at least one link attribute");
        }

        if ex.tag_types.is_empty() {
            anyhow::bail!("extraction.tag_types must not be empty");
        }

        if !ex.tag_types.contains(&ex.request_tag) {
            anyhow::bail!(
                "extraction.request_tag '{}' must appear in extraction.tag_types",
                ex.request_tag
            );
        }

        for tag in &ex.subtree_text_tags {
            if !ex.tag_types.contains(tag) {
                anyhow::bail!(
                    "extraction.subtree_text_tags entry '{}' must appear in extraction.tag_types",
                    tag
                );
            }
        }

        if ex.link_delimiter.is_empty() {
            anyhow::bail!("extraction.link_delimiter must not be empty");
        }

        if self.folds.num_folds == 0 {
            anyhow::bail!("folds.num_folds must be at least 1");
        }

        if let Some(path) = &self.text.stopwords_file {
            if !path.is_file() {
                anyhow::bail!("text.stopwords_file does not exist: {}", path.display());
            }
        }

        if let Some(path) = &self.text.lemmas_file {
            if !path.is_file() {
                anyhow::bail!("text.lemmas_file does not exist: {}", path.display());
            }
        }

        Ok(())
    }
}

impl ExtractionConfig {
    /// A minimal configuration with the reference corpus defaults,
    /// following a single `O` (object) link relation.
    pub fn with_defaults(relations: Vec<String>) -> Self {
        ExtractionConfig {
            relations,
            grade: None,
            tag_types: default_tag_types(),
            subtree_text_tags: default_subtree_text_tags(),
            decision_tag: default_decision_tag(),
            request_tag: default_request_tag(),
            fact_tag: default_fact_tag(),
            id_attr: default_id_attr(),
            grade_attr: default_grade_attr(),
            outcome_attr: default_outcome_attr(),
            link_delimiter: default_link_delimiter(),
            join_token: default_join_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_config_load_success() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[extraction]
relations = ["O"]
grade = 2

[folds]
num_folds = 4
time_budget_secs = 10
seed = 7
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.extraction.relations, vec!["O".to_string()]);
        assert_eq!(config.extraction.grade, Some(2));
        assert_eq!(config.extraction.id_attr, "ID");
        assert_eq!(config.extraction.outcome_attr, "E");
        assert_eq!(config.folds.num_folds, 4);
        assert_eq!(config.folds.seed, 7);
    }

    #[test]
    fn test_config_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[extraction]
relations = ["O", "S"]
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.extraction.tag_types.len(), 5);
        assert_eq!(config.extraction.subtree_text_tags, vec!["mot", "dec"]);
        assert_eq!(config.extraction.link_delimiter, "|");
        assert_eq!(config.folds.num_folds, 5);
        assert!(config.text.stopwords_file.is_none());
    }

    #[test]
    fn test_config_rejects_empty_relations() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[extraction]
relations = []
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("relations"));
    }

    #[test]
    fn test_config_rejects_unknown_subtree_tag() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[extraction]
relations = ["O"]
subtree_text_tags = ["nonexistent"]
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("subtree_text_tags"));
    }

    #[test]
    fn test_config_rejects_zero_folds() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[extraction]
relations = ["O"]

[folds]
num_folds = 0
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("num_folds"));
    }

    #[test]
    fn test_config_missing_file() {
        let err = Config::load(Path::new("nonexistent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
