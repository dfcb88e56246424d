//! Edge types for the constraint graph.

use serde::{Deserialize, Serialize};
use super::symbol::{SourceId, TargetId};

/// Permitted mapping from a source symbol to a target symbol.
///
/// Implements `Ord` for deterministic ordering: (source, target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source symbol.
    pub source: SourceId,
    /// Target symbol.
    pub target: TargetId,
}

impl Edge {
    /// Create a new edge.
    pub fn new(source: SourceId, target: TargetId) -> Self {
        Self { source, target }
    }
}

// Canonical ordering: source, then target
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.source.cmp(&other.source) {
            std::cmp::Ordering::Equal => self.target.cmp(&other.target),
            ord => ord,
        }
    }
}
