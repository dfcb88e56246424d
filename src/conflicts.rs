//! Conflict detection over the constraint graph.

use crate::graph::ConstraintGraph;
use crate::types::Conflict;

/// List targets claimed by more than one source.
///
/// Each entry carries `count = in_degree - 1`. Entries are sorted by count
/// descending; equal counts keep target handle order (intern order). Only
/// the count ordering is part of the contract.
pub fn conflicts(graph: &ConstraintGraph) -> Vec<Conflict> {
    let mut found: Vec<Conflict> = graph
        .inverse_index()
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(target, sources)| Conflict::new(target, sources.len() - 1))
        .collect();

    // Stable: ties stay in handle order
    found.sort_by(|a, b| b.count.cmp(&a.count));
    found
}

/// Sum of surplus claims over all conflicting targets.
pub fn conflict_mass(conflicts: &[Conflict]) -> usize {
    conflicts.iter().map(|c| c.count).sum()
}
