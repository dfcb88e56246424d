//! Conflict records.

use serde::{Deserialize, Serialize};
use super::symbol::TargetId;

/// A target symbol claimed by more than one source symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The contested target.
    pub target: TargetId,
    /// Number of surplus claims (`in_degree - 1`, always > 0).
    pub count: usize,
}

impl Conflict {
    /// Create a conflict record.
    pub fn new(target: TargetId, count: usize) -> Self {
        Self { target, count }
    }

    /// Number of sources currently claiming the target.
    pub fn in_degree(&self) -> usize {
        self.count + 1
    }
}
