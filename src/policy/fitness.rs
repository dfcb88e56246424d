//! Fitness scoring for candidate mappings.

use std::collections::BTreeMap;

use crate::frequency::FrequencyModel;
use crate::graph::ConstraintGraph;
use crate::types::SourceId;
use super::v1::ResolverPolicyV1;

/// Per-source share of corpus probability mass under the current mapping.
///
/// Each source receives the summed unigram probability of its permitted
/// targets; the result is renormalized to sum to 1. If no target of the
/// mapping was observed in the corpus every share stays 0.
pub fn source_probabilities(graph: &ConstraintGraph, model: &FrequencyModel) -> BTreeMap<SourceId, f64> {
    let mut shares: BTreeMap<SourceId, f64> = graph
        .iter()
        .map(|(source, targets)| {
            let mass = targets.iter().map(|t| model.unigram_probability(*t)).sum();
            (source, mass)
        })
        .collect();

    let z: f64 = shares.values().sum();
    if z > 0.0 {
        for share in shares.values_mut() {
            *share /= z;
        }
    }
    shares
}

/// Score how evenly a mapping spreads probability mass across sources.
///
/// Formula:
/// ```text
/// ideal  = [w/N; N] ++ [w; extra_dims]
/// actual = [w·p(s) for s] ++ [w; extra_dims]
/// fitness = cos(ideal, actual)
/// ```
///
/// `extra_dims` pads both vectors when a candidate is judged against a
/// baseline that has more support. Returns a value in [-1, 1]; higher is
/// more uniform. A zero-norm vector scores 0.
pub fn fitness(
    graph: &ConstraintGraph,
    model: &FrequencyModel,
    extra_dims: usize,
    policy: &ResolverPolicyV1,
) -> f64 {
    let shares = source_probabilities(graph, model);
    let w = policy.stability_weight;
    let n = shares.len();

    let mut ideal = vec![w / n.max(1) as f64; n];
    let mut actual: Vec<f64> = shares.values().map(|p| p * w).collect();

    ideal.extend(std::iter::repeat(w).take(extra_dims));
    actual.extend(std::iter::repeat(w).take(extra_dims));

    cosine_similarity(&ideal, &actual)
}

/// Cosine similarity of two equal-length vectors.
///
/// # Panics
///
/// Panics if the lengths differ; callers construct both vectors together,
/// so a mismatch is a defect in candidate construction.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Fitness vector length mismatch");

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, SymbolTable, TargetId};

    fn setup(corpus: &str, constraints: &[(&str, &str)]) -> (ConstraintGraph, FrequencyModel) {
        let mut sources: SymbolTable<SourceId> = SymbolTable::new();
        let mut targets: SymbolTable<TargetId> = SymbolTable::new();
        let mut edges = Vec::new();
        for (s, ts) in constraints {
            let source = sources.add(s);
            for c in ts.chars() {
                edges.push(Edge::new(source, targets.add_char(c)));
            }
        }
        let model = FrequencyModel::from_corpus(corpus, &targets);
        (ConstraintGraph::from_edges(edges), model)
    }

    #[test]
    fn test_source_probabilities_renormalize() {
        // 'z' is permitted but never observed
        let (graph, model) = setup("ab", &[("1", "az"), ("2", "b")]);
        let shares = source_probabilities(&graph, &model);

        let sum: f64 = shares.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(shares.values().all(|p| (p - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_uniform_mapping_scores_one() {
        let (graph, model) = setup("ab", &[("1", "a"), ("2", "b")]);
        let policy = ResolverPolicyV1::default();
        assert!((fitness(&graph, &model, 0, &policy) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_skewed_mapping_scores_lower() {
        let policy = ResolverPolicyV1::default();
        let (even, even_model) = setup("ab", &[("1", "a"), ("2", "b")]);
        let (skewed, skewed_model) = setup("aaab", &[("1", "a"), ("2", "b")]);

        assert!(fitness(&skewed, &skewed_model, 0, &policy) < fitness(&even, &even_model, 0, &policy));
    }

    #[test]
    fn test_extra_dims_pull_toward_one() {
        let policy = ResolverPolicyV1::default();
        let (graph, model) = setup("aaab", &[("1", "a"), ("2", "b")]);

        let base = fitness(&graph, &model, 0, &policy);
        let padded = fitness(&graph, &model, 1, &policy);
        assert!(padded > base);
        assert!(padded <= 1.0 + 1e-12);
    }

    #[test]
    fn test_unobserved_mapping_scores_zero() {
        let (graph, model) = setup("", &[("1", "a"), ("2", "b")]);
        let policy = ResolverPolicyV1::default();
        assert_eq!(fitness(&graph, &model, 0, &policy), 0.0);
    }

    #[test]
    #[should_panic(expected = "Fitness vector length mismatch")]
    fn test_length_mismatch_panics() {
        cosine_similarity(&[1.0, 2.0], &[1.0]);
    }
}
