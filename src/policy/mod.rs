//! Resolver policy and fitness scoring.

pub mod v1;
pub mod fitness;

pub use v1::{ResolverPolicyV1, StuckFallback};
pub use fitness::{fitness, source_probabilities, cosine_similarity};
