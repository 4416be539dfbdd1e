//! Text normalization for count-based encodings.
//!
//! Lowercasing, punctuation stripping, stopword removal and dictionary
//! lemmatization. All resources are loaded once into an immutable
//! [`TextNormalizer`] that is passed explicitly wherever normalization is
//! applied; there are no global dictionaries.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::TextConfig;
use crate::error::Result;

/// Immutable normalization resources plus policy.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    stopwords: HashSet<String>,
    lemmas: HashMap<String, String>,
    /// Drop words missing from the lemma dictionary instead of keeping them.
    drop_unknown: bool,
}

impl TextNormalizer {
    /// Build a normalizer from the optional resource files named in the
    /// configuration. With neither file set, [`normalize`](Self::normalize)
    /// only lowercases and strips punctuation.
    pub fn from_config(config: &TextConfig) -> Result<Self> {
        let stopwords = match &config.stopwords_file {
            Some(path) => load_stopwords(path)?,
            None => HashSet::new(),
        };
        let lemmas = match &config.lemmas_file {
            Some(path) => load_lemmas(path)?,
            None => HashMap::new(),
        };

        log::info!(
            "Text normalizer ready: {} stopwords, {} lemma entries",
            stopwords.len(),
            lemmas.len()
        );

        Ok(TextNormalizer {
            stopwords,
            lemmas,
            drop_unknown: config.drop_unknown,
        })
    }

    /// Full pipeline: lowercase, punctuation to spaces, stopword removal,
    /// lemmatization.
    pub fn normalize(&self, text: &str) -> String {
        let text = remove_punctuation(&text.to_lowercase());
        let words = text
            .split_whitespace()
            .filter(|w| !self.stopwords.contains(*w));

        let lemmas: Vec<&str> = if self.lemmas.is_empty() {
            words.collect()
        } else {
            words
                .filter_map(|w| match self.lemmas.get(w) {
                    Some(lemma) => Some(lemma.as_str()),
                    None if self.drop_unknown => None,
                    None => Some(w),
                })
                .collect()
        };

        lemmas.join(" ")
    }
}

/// Replace every non-alphanumeric character with a space.
///
/// Replacing (rather than deleting) separates articles from nouns in
/// apostrophe-heavy text, e.g. `l'ultimo -> l ultimo`, which the simple
/// dictionary lemmatizer cannot otherwise handle.
pub fn remove_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Load a stopword list: one word per line, blank lines ignored.
pub fn load_stopwords(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Load a lemma dictionary from tab-separated `lemma<TAB>form` lines.
///
/// The mapping is inverted to form -> lemma, and every lemma also maps to
/// itself so already-canonical words survive lookup.
pub fn load_lemmas(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let mut lemmas: HashMap<String, String> = HashMap::new();

    for line in content.lines() {
        let mut parts = line.splitn(2, '\t');
        let (lemma, form) = match (parts.next(), parts.next()) {
            (Some(lemma), Some(form)) => (lemma.trim(), form.trim()),
            _ => continue,
        };
        if lemma.is_empty() || form.is_empty() {
            continue;
        }
        lemmas.insert(form.to_string(), lemma.to_string());
        lemmas.insert(lemma.to_string(), lemma.to_string());
    }

    Ok(lemmas)
}
