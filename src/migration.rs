//! Payload migrations between schema versions
//!
//! Content types and blocks register one step per version they leave behind
//! (`article@v1.0.0 → article@v1.1.0`, ...). When a stored payload was written
//! against an older version, [`Migrator::migrate`] walks the registered chain
//! from the payload's version to the current one.
//!
//! Each slug has at most one outgoing step per version, so a migration path is
//! a straight line: there is no route search, and a gap in the chain is an
//! error rather than a reason to try another way round.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// A payload transform from one version to the next
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// One registered hop in a migration chain
#[derive(Clone)]
pub struct MigrationStep {
    pub from: String,
    pub to: String,
    transform: Transform,
}

impl MigrationStep {
    pub fn new<F>(from: impl Into<String>, to: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: to.into(),
            transform: Arc::new(transform),
        }
    }

    /// Run this step's transform
    pub fn apply(&self, payload: Value) -> Value {
        (self.transform)(payload)
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

type StepTable = HashMap<String, HashMap<String, MigrationStep>>;

/// Registry of migration steps, keyed by slug and source version.
///
/// Cloning a `Migrator` yields another handle onto the same table. Steps are
/// registered while the application wires itself up and read concurrently
/// afterwards.
#[derive(Clone, Default)]
pub struct Migrator {
    steps: Arc<RwLock<StepTable>>,
}

impl Migrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the step leaving `from` for `slug`.
    ///
    /// A second registration for the same `(slug, from)` replaces the first.
    pub fn register<F>(&self, slug: &str, from: &str, to: &str, transform: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let step = MigrationStep::new(from, to, transform);
        let replaced = self
            .steps
            .write()
            .entry(slug.to_string())
            .or_default()
            .insert(from.to_string(), step);

        if replaced.is_some() {
            tracing::debug!(slug, from, to, "replaced migration step");
        } else {
            tracing::debug!(slug, from, to, "registered migration step");
        }
    }

    /// Whether a step leaves `from` for `slug`
    pub fn has_step(&self, slug: &str, from: &str) -> bool {
        self.steps
            .read()
            .get(slug)
            .map_or(false, |steps| steps.contains_key(from))
    }

    /// All slugs with registered steps, sorted
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.steps.read().keys().cloned().collect();
        slugs.sort();
        slugs
    }

    /// `(from, to)` pairs registered for `slug`, sorted by `from`
    pub fn steps(&self, slug: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .steps
            .read()
            .get(slug)
            .map(|steps| steps.values().map(|s| (s.from.clone(), s.to.clone())).collect())
            .unwrap_or_default();
        pairs.sort();
        pairs
    }

    /// Resolve the chain of steps from `from` to `to` without running it.
    ///
    /// The whole chain is read under one read guard, so a concurrent
    /// registration is seen either entirely or not at all.
    pub fn plan(&self, slug: &str, from: &str, to: &str) -> Result<Vec<MigrationStep>> {
        let table = self.steps.read();
        let slug_steps = table.get(slug);

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = from.to_string();

        while current != to {
            if !visited.insert(current.clone()) {
                return Err(SchemaError::MigrationCycle {
                    slug: slug.to_string(),
                    version: current,
                });
            }
            let step = slug_steps
                .and_then(|steps| steps.get(&current))
                .ok_or_else(|| SchemaError::MigrationStepMissing {
                    slug: slug.to_string(),
                    from: current.clone(),
                })?;
            current = step.to.clone();
            chain.push(step.clone());
        }

        Ok(chain)
    }

    /// The `(from, to)` hops a migration would take
    pub fn path(&self, slug: &str, from: &str, to: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .plan(slug, from, to)?
            .into_iter()
            .map(|step| (step.from, step.to))
            .collect())
    }

    /// Migrate a payload recorded at `from` forward to `to`.
    ///
    /// The caller's payload is never touched: the chain runs on a copy, and
    /// a failure returns before any transform has run.
    pub fn migrate(&self, slug: &str, from: &str, to: &str, payload: &Value) -> Result<Value> {
        let chain = self.plan(slug, from, to)?;

        let mut current = payload.clone();
        for step in &chain {
            tracing::trace!(slug, from = %step.from, to = %step.to, "applying migration step");
            current = step.apply(current);
        }

        if !chain.is_empty() {
            tracing::debug!(slug, from, to, hops = chain.len(), "migrated payload");
        }
        Ok(current)
    }

    /// Version cycles among the registered steps of `slug`.
    ///
    /// Each cycle is reported as its sorted member versions; a step from a
    /// version to itself is a cycle of one.
    pub fn find_cycles(&self, slug: &str) -> Vec<Vec<String>> {
        let pairs = self.steps(slug);

        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut node = |graph: &mut DiGraph<String, ()>, version: &str| -> NodeIndex {
            *nodes
                .entry(version.to_string())
                .or_insert_with(|| graph.add_node(version.to_string()))
        };

        let mut self_loops = BTreeSet::new();
        for (from, to) in &pairs {
            let a = node(&mut graph, from);
            let b = node(&mut graph, to);
            graph.add_edge(a, b, ());
            if from == to {
                self_loops.insert(from.clone());
            }
        }

        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self_loops.contains(&graph[scc[0]]))
            .map(|scc| {
                let mut members: Vec<String> = scc.into_iter().map(|i| graph[i].clone()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.steps.read();
        let counts: HashMap<&String, usize> = table.iter().map(|(slug, steps)| (slug, steps.len())).collect();
        f.debug_struct("Migrator").field("steps", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rename_title(mut payload: Value) -> Value {
        if let Some(obj) = payload.as_object_mut() {
            if let Some(title) = obj.remove("title") {
                obj.insert("headline".to_string(), title);
            }
        }
        payload
    }

    fn add_summary(mut payload: Value) -> Value {
        payload["summary"] = json!("");
        payload
    }

    fn chain() -> Migrator {
        let migrator = Migrator::new();
        migrator.register("article", "article@v1.0.0", "article@v2.0.0", rename_title);
        migrator.register("article", "article@v2.0.0", "article@v2.1.0", add_summary);
        migrator
    }

    #[test]
    fn test_same_version_is_identity() {
        let payload = json!({ "title": "Hello" });
        let out = Migrator::new().migrate("article", "article@v1.0.0", "article@v1.0.0", &payload).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_chain_matches_manual_application() {
        let payload = json!({ "title": "Hello" });
        let migrated = chain().migrate("article", "article@v1.0.0", "article@v2.1.0", &payload).unwrap();
        assert_eq!(migrated, add_summary(rename_title(payload.clone())));
        assert_eq!(migrated, json!({ "headline": "Hello", "summary": "" }));
        assert_eq!(payload, json!({ "title": "Hello" }));
    }

    #[test]
    fn test_missing_step() {
        let err = chain()
            .migrate("article", "article@v0.9.0", "article@v2.1.0", &json!({}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MigrationStepMissing { ref from, .. } if from == "article@v0.9.0"));

        let err = chain().migrate("page", "page@v1.0.0", "page@v2.0.0", &json!({})).unwrap_err();
        assert!(matches!(err, SchemaError::MigrationStepMissing { .. }));
    }

    #[test]
    fn test_cycle_detection() {
        let migrator = Migrator::new();
        migrator.register("article", "A", "B", |p| p);
        migrator.register("article", "B", "A", |p| p);

        let err = migrator.migrate("article", "A", "C", &json!({})).unwrap_err();
        assert!(matches!(err, SchemaError::MigrationCycle { ref version, .. } if version == "A"));
        assert_eq!(migrator.find_cycles("article"), vec![vec!["A".to_string(), "B".to_string()]]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let migrator = Migrator::new();
        migrator.register("block", "v1", "v1", |p| p);
        assert!(matches!(
            migrator.migrate("block", "v1", "v2", &json!(null)),
            Err(SchemaError::MigrationCycle { .. })
        ));
        assert_eq!(migrator.find_cycles("block"), vec![vec!["v1".to_string()]]);
    }

    #[test]
    fn test_last_registration_wins() {
        let migrator = Migrator::new();
        migrator.register("article", "A", "B", |_| json!("first"));
        migrator.register("article", "A", "B", |_| json!("second"));
        assert_eq!(migrator.migrate("article", "A", "B", &json!({})).unwrap(), json!("second"));
        assert_eq!(migrator.steps("article").len(), 1);
    }

    #[test]
    fn test_introspection() {
        let migrator = chain();
        migrator.register("hero", "hero@v1.0.0", "hero@v1.1.0", |p| p);

        assert_eq!(migrator.slugs(), vec!["article", "hero"]);
        assert!(migrator.has_step("article", "article@v1.0.0"));
        assert!(!migrator.has_step("article", "article@v2.1.0"));
        assert_eq!(
            migrator.path("article", "article@v1.0.0", "article@v2.1.0").unwrap(),
            vec![
                ("article@v1.0.0".to_string(), "article@v2.0.0".to_string()),
                ("article@v2.0.0".to_string(), "article@v2.1.0".to_string()),
            ]
        );
        assert!(migrator.find_cycles("article").is_empty());
    }

    #[test]
    fn test_handles_share_the_table_across_threads() {
        let migrator = Migrator::new();
        let writer = migrator.clone();
        writer.register("article", "A", "B", add_summary);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let m = migrator.clone();
                std::thread::spawn(move || m.migrate("article", "A", "B", &json!({ "n": i })).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), json!({ "n": i, "summary": "" }));
        }
    }
}
