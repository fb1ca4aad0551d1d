//! Weighted OKR progress scoring.
//!
//! Always returns a value in `0..=100`. Non-finite inputs count as 0,
//! a weight below 1 counts as 1 and a key result whose target does not
//! exceed its start contributes 0.

use contracts::dashboards::d100_pharmacy_overview::ObjectiveProgress;
use contracts::domain::objective::{KeyResult, Objective};

/// Progress of one objective from its key results.
pub fn objective_progress(key_results: &[KeyResult]) -> f64 {
    if key_results.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = key_results.iter().map(effective_weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = key_results
        .iter()
        .map(|kr| key_result_progress(kr) * effective_weight(kr))
        .sum();

    clamp_percent(weighted / total_weight)
}

/// Mean of per-objective progress; 0 for an empty list.
pub fn overall_progress(objectives: &[Objective]) -> f64 {
    if objectives.is_empty() {
        return 0.0;
    }
    let sum: f64 = objectives
        .iter()
        .map(|o| objective_progress(&o.key_results))
        .sum();
    clamp_percent(sum / objectives.len() as f64)
}

/// Per-objective breakdown, in input order.
pub fn progress_breakdown(objectives: &[Objective]) -> Vec<ObjectiveProgress> {
    objectives
        .iter()
        .map(|o| ObjectiveProgress {
            id: o.id.clone(),
            title: o.title.clone(),
            progress: objective_progress(&o.key_results),
        })
        .collect()
}

/// Linear interpolation of `current` between `start` and `target`, in percent.
fn key_result_progress(kr: &KeyResult) -> f64 {
    let start = finite_or_zero(kr.start_value);
    let target = finite_or_zero(kr.target_value);
    let current = finite_or_zero(kr.current_value);

    if target <= start {
        return 0.0;
    }
    clamp_percent((current - start) / (target - start) * 100.0)
}

/// Weights below 1 (zero, negative, unreadable) count as 1.
fn effective_weight(kr: &KeyResult) -> f64 {
    finite_or_zero(kr.weight).max(1.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(key_results: Vec<KeyResult>) -> Objective {
        Objective {
            id: String::new(),
            title: String::new(),
            key_results,
        }
    }

    #[test]
    fn test_half_way_is_fifty() {
        let krs = [KeyResult::new(0.0, 100.0, 50.0, 1.0)];
        assert_eq!(objective_progress(&krs), 50.0);
    }

    #[test]
    fn test_degenerate_range_is_zero() {
        assert_eq!(objective_progress(&[KeyResult::new(0.0, 0.0, 50.0, 1.0)]), 0.0);
        // target below start is treated the same way
        assert_eq!(objective_progress(&[KeyResult::new(10.0, 5.0, 7.0, 1.0)]), 0.0);
    }

    #[test]
    fn test_empty_key_results_is_zero() {
        assert_eq!(objective_progress(&[]), 0.0);
    }

    #[test]
    fn test_weighted_mean() {
        let krs = [
            KeyResult::new(0.0, 10.0, 10.0, 1.0),
            KeyResult::new(0.0, 10.0, 0.0, 3.0),
        ];
        assert_eq!(objective_progress(&krs), 25.0);
    }

    #[test]
    fn test_degenerate_key_result_still_counts_in_weight() {
        let krs = [
            KeyResult::new(0.0, 100.0, 100.0, 1.0),
            KeyResult::new(5.0, 5.0, 5.0, 1.0),
        ];
        assert_eq!(objective_progress(&krs), 50.0);
    }

    #[test]
    fn test_each_key_result_is_clamped() {
        let krs = [
            KeyResult::new(0.0, 10.0, 30.0, 1.0),
            KeyResult::new(0.0, 10.0, 0.0, 1.0),
        ];
        // 300% is clamped to 100 before weighting
        assert_eq!(objective_progress(&krs), 50.0);

        assert_eq!(objective_progress(&[KeyResult::new(10.0, 20.0, 0.0, 1.0)]), 0.0);
    }

    #[test]
    fn test_fractional_weight_counts_as_one() {
        let krs = [
            KeyResult::new(0.0, 10.0, 10.0, 0.25),
            KeyResult::new(0.0, 10.0, 0.0, 1.0),
        ];
        assert_eq!(objective_progress(&krs), 50.0);
    }

    #[test]
    fn test_non_positive_weight_counts_as_one() {
        let zero = [
            KeyResult::new(0.0, 10.0, 10.0, 0.0),
            KeyResult::new(0.0, 10.0, 0.0, 1.0),
        ];
        assert_eq!(objective_progress(&zero), 50.0);

        let negative = [
            KeyResult::new(0.0, 10.0, 10.0, -4.0),
            KeyResult::new(0.0, 10.0, 0.0, 1.0),
        ];
        assert_eq!(objective_progress(&negative), 50.0);
    }

    #[test]
    fn test_nan_inputs_are_zero() {
        let krs = [KeyResult::new(f64::NAN, 100.0, 50.0, f64::NAN)];
        assert_eq!(objective_progress(&krs), 50.0);

        let krs = [KeyResult::new(0.0, f64::INFINITY, 50.0, 1.0)];
        assert_eq!(objective_progress(&krs), 0.0);

        let krs = [KeyResult::new(0.0, 100.0, f64::NAN, 1.0)];
        assert_eq!(objective_progress(&krs), 0.0);
    }

    #[test]
    fn test_overall_is_simple_mean() {
        let objectives = vec![
            objective(vec![KeyResult::new(0.0, 100.0, 100.0, 5.0)]),
            objective(vec![KeyResult::new(0.0, 100.0, 50.0, 1.0)]),
            objective(vec![]),
        ];
        assert_eq!(overall_progress(&objectives), 50.0);
        assert_eq!(overall_progress(&[]), 0.0);
    }

    #[test]
    fn test_breakdown_keeps_order() {
        let mut first = objective(vec![KeyResult::new(0.0, 4.0, 1.0, 1.0)]);
        first.title = "Reduce expired stock".into();
        let mut second = objective(vec![]);
        second.title = "Open second branch".into();

        let breakdown = progress_breakdown(&[first, second]);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].title, "Reduce expired stock");
        assert_eq!(breakdown[0].progress, 25.0);
        assert_eq!(breakdown[1].progress, 0.0);
    }
}
