//! Append-only knowledge store with lexical relevance retrieval
//!
//! Retrieval is a word-overlap count between the query and stored content.
//! Deliberately simple; semantic search belongs to an external collaborator
//! and this store only has to be deterministic and dependency-free.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One stored fact with free-form metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only fact store.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    items: Vec<KnowledgeItem>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, content: impl Into<String>, metadata: BTreeMap<String, String>) {
        self.items.push(KnowledgeItem {
            content: content.into(),
            metadata,
            timestamp: Utc::now(),
        });
    }

    /// The `top_k` items sharing the most words with the query, ties broken
    /// by recency (newest first). Items with zero overlap never surface.
    pub fn retrieve_relevant(&self, query: &str, top_k: usize) -> Vec<&KnowledgeItem> {
        let query_words: HashSet<String> = tokenize(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, usize)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let overlap = tokenize(&item.content)
                    .intersection(&query_words)
                    .count();
                (overlap > 0).then_some((index, overlap))
            })
            .collect();

        // Higher overlap first, then newer (larger index) first.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        scored
            .into_iter()
            .take(top_k)
            .map(|(index, _)| &self.items[index])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
