//! Composite impact-score weighting and normalization sanity tests.

use insights_graph::score::composite::{CompositeWeights, normalize_metric, weighted_sum};

#[test]
fn default_weights_sum_to_one() {
    let w = CompositeWeights::default();
    let total = w.alpha + w.beta + w.gamma + w.delta + w.epsilon;
    assert!((total - 1.0).abs() < 1e-9, "weights must sum to 1.0, got {total}");
}

#[test]
fn weighted_sum_is_clamped_to_unit_range() {
    let weights = CompositeWeights::default();
    let all_ones = weighted_sum([1.0, 1.0, 1.0, 1.0, 1.0], &weights);
    assert!((all_ones - 1.0).abs() < 1e-9);

    let all_zero = weighted_sum([0.0, 0.0, 0.0, 0.0, 0.0], &weights);
    assert_eq!(all_zero, 0.0);

    let out_of_range = weighted_sum([2.0, 2.0, 2.0, 2.0, 2.0], &weights);
    assert!((out_of_range - 1.0).abs() < 1e-9, "components are clamped before weighting");
}

#[test]
fn weighted_sum_respects_component_order() {
    let weights = CompositeWeights {
        alpha: 1.0,
        beta: 0.0,
        gamma: 0.0,
        delta: 0.0,
        epsilon: 0.0,
    };
    let score = weighted_sum([0.5, 1.0, 1.0, 1.0, 1.0], &weights);
    assert!((score - 0.5).abs() < 1e-9, "only alpha's component should matter");
}

#[test]
fn normalize_metric_maps_min_max_to_unit_range() {
    let normalized = normalize_metric(&[10.0, 20.0, 30.0]);
    assert_eq!(normalized.len(), 3);
    assert!((normalized[0] - 0.0).abs() < 1e-9);
    assert!((normalized[1] - 0.5).abs() < 1e-9);
    assert!((normalized[2] - 1.0).abs() < 1e-9);
}

#[test]
fn normalize_metric_handles_equal_values() {
    let normalized = normalize_metric(&[5.0, 5.0, 5.0]);
    assert_eq!(normalized, vec![0.0, 0.0, 0.0]);
}

#[test]
fn normalize_metric_handles_empty_input() {
    let normalized = normalize_metric(&[]);
    assert!(normalized.is_empty());
}
