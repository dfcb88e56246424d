//! Serializable summary of a resolution run.

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::frequency::FrequencyModel;
use crate::graph::ConstraintGraph;
use crate::policy::{source_probabilities, ResolverPolicyV1};
use crate::resolver::Resolution;
use crate::MNEMONIC_KERNEL_SCHEMA_VERSION;

/// One entry of the final mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Source symbol text.
    pub source: String,
    /// Remaining targets, concatenated in handle order.
    pub targets: String,
}

/// Share of corpus probability mass carried by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBalance {
    /// Source symbol text.
    pub source: String,
    /// Renormalized probability mass.
    pub probability: f64,
}

/// Unresolved conflict, by target text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Contested target text.
    pub target: String,
    /// Surplus claims (`in_degree - 1`).
    pub count: usize,
}

/// Summary of a resolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Schema version of this report.
    pub schema_version: String,
    /// Policy identifier.
    pub policy_id: String,
    /// Hash of the policy parameters.
    pub params_hash: String,
    /// SHA-256 of the word list, if known.
    pub corpus_hash: Option<String>,
    /// In-vocabulary character occurrences in the corpus.
    pub unigram_total: u64,
    /// Digram occurrences in the corpus.
    pub digram_total: u64,
    /// Fingerprint of the graph as loaded.
    pub initial_fingerprint: String,
    /// Fingerprint of the final graph.
    pub final_fingerprint: String,
    /// Outcome label (`resolved`, `stuck`, `iteration_limit`).
    pub outcome: String,
    /// Committed moves.
    pub iterations: usize,
    /// Moves committed by the stuck fallback.
    pub forced_moves: usize,
    /// Conflicts left in the final graph.
    pub unresolved: Vec<ConflictEntry>,
    /// Final mapping.
    pub mapping: Vec<MappingEntry>,
    /// Per-source balance of the final mapping.
    pub balance: Vec<SourceBalance>,
}

impl ResolutionReport {
    /// Build a report. `dictionary` must already hold the final graph.
    pub fn build(
        dictionary: &Dictionary,
        initial: &ConstraintGraph,
        model: &FrequencyModel,
        resolution: &Resolution,
        policy: &ResolverPolicyV1,
        corpus_hash: Option<String>,
    ) -> Self {
        let graph = dictionary.graph();
        let sources = dictionary.sources();

        let mapping = graph
            .sources()
            .map(|s| MappingEntry {
                source: sources.text(s).to_string(),
                targets: dictionary.target_string(s),
            })
            .collect();

        let balance = source_probabilities(graph, model)
            .into_iter()
            .map(|(s, probability)| SourceBalance {
                source: sources.text(s).to_string(),
                probability,
            })
            .collect();

        let unresolved = resolution
            .outcome
            .remaining_conflicts()
            .iter()
            .map(|c| ConflictEntry {
                target: dictionary.targets().text(c.target).to_string(),
                count: c.count,
            })
            .collect();

        Self {
            schema_version: MNEMONIC_KERNEL_SCHEMA_VERSION.to_string(),
            policy_id: policy.policy_id().to_string(),
            params_hash: policy.params_hash(),
            corpus_hash,
            unigram_total: model.unigram_total(),
            digram_total: model.digram_total(),
            initial_fingerprint: initial.fingerprint(),
            final_fingerprint: graph.fingerprint(),
            outcome: resolution.outcome.label().to_string(),
            iterations: resolution.iterations(),
            forced_moves: resolution.forced_moves(),
            unresolved,
            mapping,
            balance,
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
