//! Artifact dependency graph over a validated schema

use crate::schema::{Artifact, Schema};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Read-only DAG view of a schema's artifacts
///
/// Built from an already validated [`Schema`], so every `requires` entry is
/// known to resolve and the graph is acyclic.
#[derive(Debug, Clone)]
pub struct ArtifactGraph {
    artifacts: Vec<Artifact>,
}

impl ArtifactGraph {
    /// Create graph from schema
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            artifacts: schema.artifacts.clone(),
        }
    }

    /// Artifacts in declaration order
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Look up an artifact by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Topological order, ties broken by declaration order
    #[must_use]
    pub fn build_order(&self) -> Vec<&str> {
        let mut emitted: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(self.artifacts.len());

        while order.len() < self.artifacts.len() {
            let next = self.artifacts.iter().find(|a| {
                !emitted.contains(a.id.as_str())
                    && a.requires.iter().all(|r| emitted.contains(r.as_str()))
            });
            match next {
                Some(artifact) => {
                    emitted.insert(&artifact.id);
                    order.push(artifact.id.as_str());
                }
                // Unreachable for a validated schema
                None => break,
            }
        }

        order
    }

    /// Incomplete artifacts whose requirements are all complete
    #[must_use]
    pub fn ready(&self, completed: &BTreeSet<String>) -> Vec<&str> {
        self.artifacts
            .iter()
            .filter(|a| !completed.contains(&a.id))
            .filter(|a| a.requires.iter().all(|r| completed.contains(r)))
            .map(|a| a.id.as_str())
            .collect()
    }

    /// Incomplete artifacts with at least one unmet requirement
    #[must_use]
    pub fn blocked(&self, completed: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
        self.artifacts
            .iter()
            .filter(|a| !completed.contains(&a.id))
            .filter_map(|a| {
                let missing: Vec<String> = a
                    .requires
                    .iter()
                    .filter(|r| !completed.contains(*r))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then(|| (a.id.clone(), missing))
            })
            .collect()
    }

    /// Whether every artifact is complete
    #[must_use]
    pub fn is_complete(&self, completed: &BTreeSet<String>) -> bool {
        self.artifacts.iter().all(|a| completed.contains(&a.id))
    }

    /// Artifacts that directly require `id`
    #[must_use]
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.artifacts
            .iter()
            .filter(|a| a.requires.iter().any(|r| r == id))
            .map(|a| a.id.as_str())
            .collect()
    }
}
