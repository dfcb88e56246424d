//! # mnemonic-kernel
//!
//! Frequency-balanced mnemonic dictionary construction.
//!
//! The kernel answers one question:
//!
//! > Given which letters each digit *may* stand for, which letters *should*
//! > it stand for so that no letter is shared and every digit carries a
//! > similar share of real-word letter frequency?
//!
//! ## Core Contract
//!
//! 1. Load equality constraints into a many-to-many constraint graph
//! 2. Measure target-symbol frequencies in a reference word list
//! 3. Greedily remove conflicting edges, always keeping at least one target
//!    per source, until no target is shared or no acceptable move remains
//! 4. Report the outcome explicitly: resolved, stuck, or iteration limit
//!
//! ## Architecture
//!
//! ```text
//! constraints ─→ Dictionary ─→ ConstraintGraph ─┐
//!                    │                          ├─→ GreedyResolver ─→ Resolution ─→ Report
//! word list ───→ FrequencyModel ────────────────┘        ↑
//!                                         conflicts() + fitness()
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Symbol handles are allocated in intern order
//! - Graphs iterate in handle order (BTreeMap/BTreeSet)
//! - Conflict lists and candidate ties resolve by handle order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod graph;
pub mod frequency;
pub mod policy;
pub mod conflicts;
pub mod resolver;
pub mod dictionary;
pub mod report;
pub mod pipeline;
pub mod canonical;
pub mod canonical_content;

// Re-exports
pub use types::{SymbolHandle, SymbolTable, SourceId, TargetId, Edge, Conflict};
pub use graph::{ConstraintGraph, GraphError, InverseIndex};
pub use frequency::{FrequencyModel, FrequencyCounter};
pub use policy::{ResolverPolicyV1, StuckFallback, fitness, source_probabilities, cosine_similarity};
pub use conflicts::{conflicts, conflict_mass};
pub use resolver::{
    GreedyResolver, Resolution, ResolutionCandidate, IterationRecord,
    Outcome, ResolverState, ResolverError,
};
pub use dictionary::{Dictionary, DictionaryError, DICTIONARY_HEADER};
pub use report::{ResolutionReport, MappingEntry, SourceBalance, ConflictEntry};
pub use pipeline::{Pipeline, PipelineOutput, PipelineError, read_text};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use canonical_content::{
    CANONICAL_CONTENT_VERSION, decode_input, normalize_text,
    compute_content_hash, validate_content_hash, HashValidation,
};

/// Schema version for reports and serialized dictionaries.
/// Increment on breaking changes to any schema type.
pub const MNEMONIC_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "resolver_policy_v1";
