//! In-memory corpus index.
//!
//! Languages keep first-appearance order. Within a language, articles are
//! ordered by ascending article id and each article keeps its entity rows in
//! file order.

use std::collections::{BTreeMap, HashMap};

use crate::domain::EntityRecord;

/// One article with its entity rows
#[derive(Debug, Clone)]
pub struct Article<'a> {
    pub id: &'a str,
    pub lang: &'a str,
    pub entities: Vec<&'a EntityRecord>,
}

impl Article<'_> {
    /// Article text, taken from the first entity row
    pub fn text(&self) -> &str {
        self.entities.first().map(|e| e.text.as_str()).unwrap_or("")
    }
}

/// Read-only corpus, loaded once per process
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<EntityRecord>,
    languages: Vec<String>,
    by_lang: HashMap<String, BTreeMap<String, Vec<usize>>>,
    fingerprint: String,
}

impl Corpus {
    pub fn new(records: Vec<EntityRecord>, fingerprint: String) -> Self {
        let mut languages: Vec<String> = Vec::new();
        let mut by_lang: HashMap<String, BTreeMap<String, Vec<usize>>> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            if !languages.contains(&record.lang) {
                languages.push(record.lang.clone());
            }
            by_lang
                .entry(record.lang.clone())
                .or_default()
                .entry(record.article_id.clone())
                .or_default()
                .push(i);
        }

        Self {
            records,
            languages,
            by_lang,
            fingerprint,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Languages in first-appearance order
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn has_language(&self, lang: &str) -> bool {
        self.by_lang.contains_key(lang)
    }

    /// (article_id, entity count) pairs in ascending id order
    pub fn article_sizes(&self, lang: &str) -> Vec<(String, usize)> {
        self.by_lang
            .get(lang)
            .map(|articles| {
                articles
                    .iter()
                    .map(|(id, rows)| (id.clone(), rows.len()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entity rows of an article, in file order
    pub fn entities(&self, lang: &str, article_id: &str) -> Vec<&EntityRecord> {
        self.by_lang
            .get(lang)
            .and_then(|articles| articles.get(article_id))
            .map(|rows| rows.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    pub fn article(&self, lang: &str, article_id: &str) -> Option<Article<'_>> {
        let (id, rows) = self.by_lang.get(lang)?.get_key_value(article_id)?;
        Some(Article {
            id: id.as_str(),
            lang: self.records[rows[0]].lang.as_str(),
            entities: rows.iter().map(|&i| &self.records[i]).collect(),
        })
    }

    /// Total entity rows for a language
    pub fn entity_count(&self, lang: &str) -> usize {
        self.by_lang
            .get(lang)
            .map(|articles| articles.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}
