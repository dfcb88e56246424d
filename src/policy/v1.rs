//! ResolverPolicy v1: greedy edge removal with an explicit stuck fallback.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing to avoid cross-platform
//! serialization differences. The quantization factor is 1e6 (multiply by
//! 1,000,000 and round to i64).

use serde::{Deserialize, Serialize};
use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// What the resolver does when no candidate improves fitness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckFallback {
    /// Stop and report the unresolved conflicts.
    Halt,
    /// Commit the best-scoring candidate even though it does not improve
    /// fitness. Every commit still removes one conflicting edge.
    #[default]
    ForceBest,
}

impl std::fmt::Display for StuckFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Halt => write!(f, "halt"),
            Self::ForceBest => write!(f, "force_best"),
        }
    }
}

/// Quantize a float to an i64 for deterministic hashing.
fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Fitness vectors scaled by a non-positive weight collapse to zero.
fn sanitize_weight(weight: f64) -> f64 {
    if weight > 0.0 {
        weight
    } else {
        1.0
    }
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuantizedPolicyParams {
    version: String,
    max_iterations: usize,
    stability_weight: i64,
    fallback: StuckFallback,
}

/// Resolver policy version 1.
///
/// ## Parameters
///
/// - `max_iterations`: Hard cap on committed moves (non-termination guard)
/// - `stability_weight`: Scale applied to ideal and actual fitness vectors
/// - `fallback`: Behavior when no candidate improves fitness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicyV1 {
    /// Policy version identifier.
    pub version: String,
    /// Maximum number of committed moves.
    pub max_iterations: usize,
    /// Multiplier applied to fitness vectors for numerical stability.
    pub stability_weight: f64,
    /// Stuck-state fallback.
    pub fallback: StuckFallback,
}

impl ResolverPolicyV1 {
    /// Create a new policy with custom parameters.
    pub fn new(max_iterations: usize, stability_weight: f64, fallback: StuckFallback) -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            max_iterations,
            stability_weight: sanitize_weight(stability_weight),
            fallback,
        }
    }

    /// Policy that stops at the first non-improving iteration.
    pub fn strict() -> Self {
        Self {
            fallback: StuckFallback::Halt,
            ..Self::default()
        }
    }

    /// Parse a policy from JSON. Missing fields take their defaults, and a
    /// non-positive `stability_weight` becomes 1.0 as in [`Self::new`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut policy: Self = serde_json::from_str(json)?;
        policy.stability_weight = sanitize_weight(policy.stability_weight);
        Ok(policy)
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the policy parameters.
    ///
    /// Uses quantized float representation for cross-platform consistency.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            max_iterations: self.max_iterations,
            stability_weight: quantize_float(self.stability_weight),
            fallback: self.fallback,
        }
    }
}

impl Default for ResolverPolicyV1 {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            max_iterations: 10_000,
            stability_weight: 10.0,
            fallback: StuckFallback::ForceBest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_params_hash_determinism() {
        let policy1 = ResolverPolicyV1::default();
        let policy2 = ResolverPolicyV1::default();

        assert_eq!(policy1.params_hash(), policy2.params_hash());
    }

    #[test]
    fn test_policy_params_hash_changes() {
        let policy1 = ResolverPolicyV1::default();
        let policy2 = ResolverPolicyV1::strict();

        assert_ne!(policy1.params_hash(), policy2.params_hash());
    }

    #[test]
    fn test_non_positive_weight_is_replaced() {
        let policy = ResolverPolicyV1::new(5, 0.0, StuckFallback::Halt);
        assert_eq!(policy.stability_weight, 1.0);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let policy = ResolverPolicyV1::from_json(r#"{"fallback": "halt", "max_iterations": 3}"#).unwrap();
        assert_eq!(policy.fallback, StuckFallback::Halt);
        assert_eq!(policy.max_iterations, 3);
        assert_eq!(policy.stability_weight, 10.0);
        assert_eq!(policy.policy_id(), DEFAULT_POLICY_VERSION);
    }

    #[test]
    fn test_from_json_replaces_non_positive_weight() {
        let zero = ResolverPolicyV1::from_json(r#"{"stability_weight": 0}"#).unwrap();
        let negative = ResolverPolicyV1::from_json(r#"{"stability_weight": -2.5}"#).unwrap();

        assert_eq!(zero.stability_weight, 1.0);
        assert_eq!(negative.stability_weight, 1.0);
        assert_eq!(zero.params_hash(), ResolverPolicyV1::new(10_000, 0.0, StuckFallback::ForceBest).params_hash());
    }

    #[test]
    fn test_default_fallback_forces_best() {
        assert_eq!(StuckFallback::default(), StuckFallback::ForceBest);
        assert_eq!(ResolverPolicyV1::default().fallback, StuckFallback::default());
    }
}
