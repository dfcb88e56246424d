//! Constraint graph: permitted source → target mappings.
//!
//! The graph is built once from equality constraints and afterwards only
//! shrinks, one edge at a time, under the resolver.

use std::collections::{BTreeMap, BTreeSet};

use crate::canonical::canonical_hash_hex;
use crate::types::{Edge, SourceId, TargetId};

/// Error type for graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The edge is not present in the graph.
    #[error("Edge not found: {source_id} -> {target_id}")]
    EdgeNotFound {
        /// Source of the missing edge.
        source_id: SourceId,
        /// Target of the missing edge.
        target_id: TargetId,
    },
    /// Removing the edge would leave its source without any target.
    #[error("Refusing to remove last edge of source {0}")]
    LastEdge(SourceId),
}

/// Inverse index: target -> sources permitted to map to it.
pub type InverseIndex = BTreeMap<TargetId, BTreeSet<SourceId>>;

/// Many-to-many mapping from source symbols to permitted target symbols.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order (by handle, i.e.
/// intern order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintGraph {
    /// Source -> permitted targets.
    forward: BTreeMap<SourceId, BTreeSet<TargetId>>,
}

impl ConstraintGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a list of edges.
    pub fn from_edges<I: IntoIterator<Item = Edge>>(edges: I) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert(edge.source, edge.target);
        }
        graph
    }

    /// Install an edge. Only called while loading.
    pub(crate) fn insert(&mut self, source: SourceId, target: TargetId) -> bool {
        self.forward.entry(source).or_default().insert(target)
    }

    /// Permitted targets of a source.
    pub fn targets(&self, source: SourceId) -> Option<&BTreeSet<TargetId>> {
        self.forward.get(&source)
    }

    /// Whether `source -> target` is permitted.
    pub fn contains(&self, source: SourceId, target: TargetId) -> bool {
        self.forward
            .get(&source)
            .map(|set| set.contains(&target))
            .unwrap_or(false)
    }

    /// All sources, in handle order.
    pub fn sources(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.forward.keys().copied()
    }

    /// Iterate over `(source, targets)` in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &BTreeSet<TargetId>)> + '_ {
        self.forward.iter().map(|(s, t)| (*s, t))
    }

    /// Number of sources with at least one edge.
    pub fn num_sources(&self) -> usize {
        self.forward.len()
    }

    /// Total number of edges.
    pub fn num_edges(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// All edges in canonical (source, target) order.
    pub fn edges(&self) -> Vec<Edge> {
        self.forward
            .iter()
            .flat_map(|(s, targets)| targets.iter().map(move |t| Edge::new(*s, *t)))
            .collect()
    }

    /// Number of sources currently permitted to map to `target`.
    pub fn in_degree(&self, target: TargetId) -> usize {
        self.forward.values().filter(|set| set.contains(&target)).count()
    }

    /// Recompute the inverse index from the current edges.
    ///
    /// Not cached: the resolver changes the graph on every iteration.
    pub fn inverse_index(&self) -> InverseIndex {
        let mut inverse = InverseIndex::new();
        for (source, targets) in &self.forward {
            for target in targets {
                inverse.entry(*target).or_default().insert(*source);
            }
        }
        inverse
    }

    /// Remove a single edge in place.
    ///
    /// Fails if the edge is absent or is the last edge of its source.
    pub fn remove_edge(&mut self, source: SourceId, target: TargetId) -> Result<(), GraphError> {
        let targets = self
            .forward
            .get_mut(&source)
            .filter(|set| set.contains(&target))
            .ok_or(GraphError::EdgeNotFound { source_id: source, target_id: target })?;

        if targets.len() < 2 {
            return Err(GraphError::LastEdge(source));
        }
        targets.remove(&target);
        Ok(())
    }

    /// Copy-on-write snapshot of this graph with one edge removed.
    pub fn without_edge(&self, source: SourceId, target: TargetId) -> Result<Self, GraphError> {
        let mut candidate = self.clone();
        candidate.remove_edge(source, target)?;
        Ok(candidate)
    }

    /// Deterministic fingerprint of the edge set.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(&self.edges())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolHandle;

    fn s(i: u32) -> SourceId {
        SourceId::from_index(i)
    }

    fn t(i: u32) -> TargetId {
        TargetId::from_index(i)
    }

    fn sample_graph() -> ConstraintGraph {
        // 0 -> {0, 1}, 1 -> {1, 2}
        ConstraintGraph::from_edges(vec![
            Edge::new(s(0), t(0)),
            Edge::new(s(0), t(1)),
            Edge::new(s(1), t(1)),
            Edge::new(s(1), t(2)),
        ])
    }

    #[test]
    fn test_counts_and_degrees() {
        let graph = sample_graph();
        assert_eq!(graph.num_sources(), 2);
        assert_eq!(graph.num_edges(), 4);
        assert_eq!(graph.in_degree(t(1)), 2);
        assert_eq!(graph.in_degree(t(0)), 1);
        assert_eq!(graph.in_degree(t(9)), 0);
    }

    #[test]
    fn test_inverse_index_consistency() {
        let graph = sample_graph();
        let inverse = graph.inverse_index();

        for edge in graph.edges() {
            assert!(inverse[&edge.target].contains(&edge.source));
        }
        for (target, sources) in &inverse {
            for source in sources {
                assert!(graph.contains(*source, *target));
            }
        }
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = sample_graph();
        graph.remove_edge(s(0), t(1)).unwrap();
        assert!(!graph.contains(s(0), t(1)));
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn test_remove_last_edge_refused() {
        let mut graph = sample_graph();
        graph.remove_edge(s(0), t(1)).unwrap();
        assert_eq!(graph.remove_edge(s(0), t(0)), Err(GraphError::LastEdge(s(0))));
        assert!(graph.contains(s(0), t(0)));
    }

    #[test]
    fn test_remove_missing_edge() {
        let mut graph = sample_graph();
        assert_eq!(
            graph.remove_edge(s(0), t(2)),
            Err(GraphError::EdgeNotFound { source_id: s(0), target_id: t(2) })
        );
    }

    #[test]
    fn test_without_edge_leaves_original_untouched() {
        let graph = sample_graph();
        let candidate = graph.without_edge(s(1), t(1)).unwrap();

        assert!(graph.contains(s(1), t(1)));
        assert!(!candidate.contains(s(1), t(1)));
        assert_ne!(graph.fingerprint(), candidate.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = sample_graph();
        let mut edges = a.edges();
        edges.reverse();
        let b = ConstraintGraph::from_edges(edges);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
