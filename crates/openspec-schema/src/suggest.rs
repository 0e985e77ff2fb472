//! "Did you mean" support for unknown schema names

use crate::locator::SchemaSource;
use std::collections::BTreeMap;
use std::fmt;

/// Maximum edit distance for a name to be suggested
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Lookup failure for a schema name, with suggestions and the visible catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSchema {
    /// Requested name
    pub name: String,
    /// Close matches, nearest first
    pub suggestions: Vec<String>,
    /// Names provided by each tier
    pub catalog: BTreeMap<SchemaSource, Vec<String>>,
}

impl UnknownSchema {
    /// Build from requested name and catalog
    #[must_use]
    pub fn new(name: impl Into<String>, catalog: BTreeMap<SchemaSource, Vec<String>>) -> Self {
        let name = name.into();
        let mut all: Vec<&str> = catalog.values().flatten().map(String::as_str).collect();
        all.sort_unstable();
        all.dedup();
        let suggestions = suggest(&name, &all);
        Self {
            name,
            suggestions,
            catalog,
        }
    }

    /// All visible names, sorted and deduplicated
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        let mut all: Vec<String> = self.catalog.values().flatten().cloned().collect();
        all.sort();
        all.dedup();
        all
    }
}

impl fmt::Display for UnknownSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema '{}' not found", self.name)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nDid you mean: {}?", self.suggestions.join(", "))?;
        }
        write!(f, "\nAvailable schemas:")?;
        if self.catalog.values().all(Vec::is_empty) {
            return write!(f, " (none)");
        }
        for (source, names) in &self.catalog {
            if names.is_empty() {
                continue;
            }
            write!(f, "\n  {source}: {}", names.join(", "))?;
        }
        Ok(())
    }
}

/// Candidates within [`MAX_SUGGESTION_DISTANCE`], nearest first
#[must_use]
pub fn suggest(name: &str, candidates: &[&str]) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|c| (levenshtein(name, c), *c))
        .filter(|(d, _)| *d <= MAX_SUGGESTION_DISTANCE)
        .collect();
    scored.sort();
    scored.into_iter().map(|(_, c)| c.to_string()).collect()
}

/// Edit distance over chars
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
