//! Allow-list documents published alongside a policy root

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::leaf::Leaf;
use super::model::Pattern;
use super::raw::RawInteraction;
use crate::errors::{DpfError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct PatternDocument {
    patterns: Vec<RawInteraction>,
}

/// A publisher's declared allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{ "patterns": [ ... ] }`, validating every entry.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: PatternDocument = serde_json::from_str(text)?;
        let mut set = PatternSet::new();
        for (index, raw) in document.patterns.iter().enumerate() {
            let pattern = raw
                .to_pattern()
                .map_err(|err| DpfError::invalid(format!("pattern #{index}: {err}")))?;
            set.insert(pattern);
        }
        Ok(set)
    }

    /// Render back into the document form.
    pub fn to_json(&self) -> Result<String> {
        let document = PatternDocument {
            patterns: self.patterns.iter().map(RawInteraction::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Add a pattern; duplicates are ignored.
    pub fn insert(&mut self, pattern: Pattern) -> bool {
        if self.patterns.contains(&pattern) {
            return false;
        }
        self.patterns.push(pattern);
        true
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The leaf set a trie is built from.
    pub fn leaves(&self) -> BTreeSet<Leaf> {
        self.patterns.iter().map(Pattern::to_leaf).collect()
    }
}

impl FromIterator<Pattern> for PatternSet {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        let mut set = PatternSet::new();
        for pattern in iter {
            set.insert(pattern);
        }
        set
    }
}
