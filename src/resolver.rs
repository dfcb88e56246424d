//! Greedy conflict resolver.
//!
//! The resolver removes one conflicting edge per iteration, choosing the
//! removal that most improves fitness, until the mapping is conflict-free or
//! no acceptable move remains.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conflicts::{conflict_mass, conflicts};
use crate::frequency::FrequencyModel;
use crate::graph::{ConstraintGraph, GraphError};
use crate::policy::{fitness, ResolverPolicyV1, StuckFallback};
use crate::types::{Conflict, Edge};

/// Error type for resolver operations.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// Graph error (should never happen - candidates are pre-filtered).
    #[error("Internal graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Resolver state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverState {
    /// Conflicts present, moves still being made.
    Active,
    /// No conflicts remain.
    Done,
    /// Conflicts remain and no acceptable move exists.
    Stuck,
}

/// How a resolution run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The mapping is conflict-free.
    Resolved,
    /// No acceptable candidate was found.
    Stuck {
        /// Conflicts left in the final mapping.
        conflicts: Vec<Conflict>,
    },
    /// The iteration cap was reached.
    IterationLimit {
        /// Conflicts left in the final mapping.
        conflicts: Vec<Conflict>,
    },
}

impl Outcome {
    /// Whether the run ended conflict-free.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Terminal state of the state machine.
    pub fn state(&self) -> ResolverState {
        match self {
            Self::Resolved => ResolverState::Done,
            Self::Stuck { .. } | Self::IterationLimit { .. } => ResolverState::Stuck,
        }
    }

    /// Conflicts left unresolved (empty when resolved).
    pub fn remaining_conflicts(&self) -> &[Conflict] {
        match self {
            Self::Resolved => &[],
            Self::Stuck { conflicts } | Self::IterationLimit { conflicts } => conflicts,
        }
    }

    /// Short label for reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Stuck { .. } => "stuck",
            Self::IterationLimit { .. } => "iteration_limit",
        }
    }
}

/// One committed move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Zero-based iteration number.
    pub iteration: usize,
    /// Number of conflicting targets before the move.
    pub conflicts: usize,
    /// Total surplus claims before the move.
    pub conflict_mass: usize,
    /// Fitness of the mapping before the move.
    pub baseline_fitness: f64,
    /// Edge removed by the move.
    pub removed: Edge,
    /// Score of the committed candidate.
    pub candidate_fitness: f64,
    /// Number of candidates scored this iteration.
    pub candidates_evaluated: usize,
    /// Whether the move was committed by the stuck fallback.
    pub forced: bool,
}

/// Result of a resolution run.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Final mapping.
    pub graph: ConstraintGraph,
    /// How the run ended.
    pub outcome: Outcome,
    /// Committed moves, in order.
    pub history: Vec<IterationRecord>,
}

impl Resolution {
    /// Number of committed moves.
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    /// Number of moves committed by the stuck fallback.
    pub fn forced_moves(&self) -> usize {
        self.history.iter().filter(|r| r.forced).count()
    }
}

/// Candidate mapping with one edge removed, and its score.
#[derive(Debug, Clone)]
pub struct ResolutionCandidate {
    /// Edge removed from the current mapping.
    pub removed: Edge,
    /// Fitness of the candidate mapping.
    pub fitness: f64,
    /// Copy-on-write snapshot of the candidate mapping.
    pub graph: ConstraintGraph,
}

/// Greedy conflict resolver.
///
/// ## Algorithm
///
/// 1. Compute conflicts; stop if none
/// 2. Score the current mapping (baseline)
/// 3. Recompute the inverse index from the current mapping
/// 4. For every conflicting target and every claiming source that keeps at
///    least one other edge, score the mapping without that edge
/// 5. Commit the best candidate that beats the baseline; otherwise apply
///    the policy fallback or stop as stuck
/// 6. Repeat, up to `max_iterations` commits
///
/// Each commit removes exactly one edge, so a run never makes more moves
/// than the graph has edges.
#[derive(Debug, Clone, Default)]
pub struct GreedyResolver {
    policy: ResolverPolicyV1,
}

impl GreedyResolver {
    /// Create a resolver with the given policy.
    pub fn new(policy: ResolverPolicyV1) -> Self {
        Self { policy }
    }

    /// Get the policy.
    pub fn policy(&self) -> &ResolverPolicyV1 {
        &self.policy
    }

    /// State of a freshly loaded graph.
    pub fn initial_state(graph: &ConstraintGraph) -> ResolverState {
        if conflicts(graph).is_empty() {
            ResolverState::Done
        } else {
            ResolverState::Active
        }
    }

    /// Score every allowed single-edge removal, best first.
    ///
    /// Ties keep enumeration order: conflicts by count then target handle,
    /// sources by handle.
    pub fn candidates(
        &self,
        graph: &ConstraintGraph,
        model: &FrequencyModel,
        current: &[Conflict],
    ) -> Result<Vec<ResolutionCandidate>, ResolverError> {
        let inverse = graph.inverse_index();
        let mut candidates = Vec::new();

        for conflict in current {
            let Some(claimants) = inverse.get(&conflict.target) else {
                continue;
            };
            for &source in claimants {
                let removable = graph.targets(source).map(|t| t.len() > 1).unwrap_or(false);
                if !removable {
                    continue;
                }
                let candidate = graph.without_edge(source, conflict.target)?;
                let score = fitness(&candidate, model, 1, &self.policy);
                debug!(
                    edge_source = %source,
                    edge_target = %conflict.target,
                    fitness = score,
                    "Scored candidate removal"
                );
                candidates.push(ResolutionCandidate {
                    removed: Edge::new(source, conflict.target),
                    fitness: score,
                    graph: candidate,
                });
            }
        }

        candidates.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(candidates)
    }

    /// Run the resolver to termination.
    pub fn resolve(
        &self,
        graph: ConstraintGraph,
        model: &FrequencyModel,
    ) -> Result<Resolution, ResolverError> {
        let mut graph = graph;
        let mut history: Vec<IterationRecord> = Vec::new();

        let outcome = loop {
            let current = conflicts(&graph);
            if current.is_empty() {
                break Outcome::Resolved;
            }
            if history.len() >= self.policy.max_iterations {
                warn!(
                    max_iterations = self.policy.max_iterations,
                    conflicts = current.len(),
                    "Iteration limit reached"
                );
                break Outcome::IterationLimit { conflicts: current };
            }

            let baseline = fitness(&graph, model, 0, &self.policy);
            info!(
                iteration = history.len(),
                conflicts = current.len(),
                fitness = baseline,
                "Resolver iteration"
            );

            let candidates = self.candidates(&graph, model, &current)?;
            let candidates_evaluated = candidates.len();

            let Some(best) = candidates.into_iter().next() else {
                warn!(conflicts = current.len(), "No removable edge left");
                break Outcome::Stuck { conflicts: current };
            };

            let forced = best.fitness <= baseline;
            if forced {
                match self.policy.fallback {
                    StuckFallback::Halt => {
                        warn!(
                            conflicts = current.len(),
                            best_fitness = best.fitness,
                            baseline = baseline,
                            "No improving move"
                        );
                        break Outcome::Stuck { conflicts: current };
                    }
                    StuckFallback::ForceBest => {
                        warn!(
                            edge_source = %best.removed.source,
                            edge_target = %best.removed.target,
                            fitness = best.fitness,
                            baseline = baseline,
                            "No improving move, forcing best candidate"
                        );
                    }
                }
            }

            history.push(IterationRecord {
                iteration: history.len(),
                conflicts: current.len(),
                conflict_mass: conflict_mass(&current),
                baseline_fitness: baseline,
                removed: best.removed,
                candidate_fitness: best.fitness,
                candidates_evaluated,
                forced,
            });
            graph = best.graph;
        };

        info!(
            outcome = outcome.label(),
            iterations = history.len(),
            edges = graph.num_edges(),
            "Resolution finished"
        );

        Ok(Resolution { graph, outcome, history })
    }
}
