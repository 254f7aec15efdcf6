//! Cross-check of aggregated costs against the solver's objective.

use cep_core::ModelCosts;

use crate::table::{AggregateRow, ReportCategory};

/// Outcome of comparing an aggregated cost breakdown against the solved
/// model's named cost expressions
#[derive(Debug, Clone, Default)]
pub struct CostValidation {
    /// Objective recomputed from the model's cost expressions
    pub expected: f64,
    /// Grand-total row of the aggregated breakdown
    pub reported: f64,
    pub gap_abs: f64,
    pub tolerance: f64,
    pub passed: bool,
}

impl CostValidation {
    /// Log a warning if the breakdown does not reproduce the objective
    pub fn warn_if_failed(&self, context: &str) {
        if !self.passed {
            tracing::warn!(
                "{}: aggregated total {:.6} differs from model objective {:.6} by {:.3e} (tolerance {:.3e})",
                context,
                self.reported,
                self.expected,
                self.gap_abs,
                self.tolerance
            );
        }
    }
}

/// Check that the aggregated breakdown reproduces the solver's objective.
///
/// A mismatch indicates a reporting bug, not an infeasible solve: the
/// check warns with the numeric discrepancy and never aborts the run.
/// The tolerance is relative to the objective magnitude, floored at one.
pub fn validate_total_cost(
    aggregated: &[AggregateRow],
    model_costs: &ModelCosts,
    discounted: bool,
    scaling: f64,
) -> CostValidation {
    let expected = model_costs.expected_objective(discounted, scaling);
    let reported = aggregated
        .iter()
        .find(|row| row.key == "Total" && row.category == ReportCategory::Total)
        .map(|row| row.value)
        .unwrap_or(0.0);
    let gap_abs = (reported - expected).abs();
    let tolerance = 1e-6 * expected.abs().max(1.0);
    let validation = CostValidation {
        expected,
        reported,
        gap_abs,
        tolerance,
        passed: gap_abs <= tolerance,
    };
    let context = if discounted {
        "discounted cost validation"
    } else {
        "undiscounted cost validation"
    };
    validation.warn_if_failed(context);
    validation
}
