//! Benders solve results and convergence history.

use std::time::Duration;

use cep_core::{Case, CepError, CepResult};

use super::collect::{aggregate_operational_costs, write_back_period};
use super::subproblems::{PeriodSubproblemMap, SubproblemsData};
use crate::reporting::{get_detailed_costs_benders, DetailedCosts};

/// One iteration of the Benders convergence history
#[derive(Debug, Clone, Copy, Default)]
pub struct BendersIteration {
    pub iteration: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub solve_time: Duration,
}

impl BendersIteration {
    /// Relative optimality gap
    pub fn gap(&self) -> f64 {
        let gap_abs = self.upper_bound - self.lower_bound;
        if self.upper_bound.abs() > 1e-10 {
            gap_abs / self.upper_bound.abs()
        } else {
            0.0
        }
    }
}

/// Everything a finished Benders solve hands to reporting.
///
/// The planning problem is the single source of truth for capacities;
/// subproblems only determine operational quantities and duals given
/// fixed capacities.
#[derive(Debug, Clone)]
pub struct BendersResults {
    pub planning: Case,
    pub subproblems: SubproblemsData,
    pub period_map: PeriodSubproblemMap,
    pub history: Vec<BendersIteration>,
}

impl BendersResults {
    pub fn new(
        planning: Case,
        subproblems: SubproblemsData,
        period_map: PeriodSubproblemMap,
    ) -> Self {
        Self {
            planning,
            subproblems,
            period_map,
            history: Vec::new(),
        }
    }

    /// Append one iteration to the convergence history
    pub fn record_iteration(&mut self, lower_bound: f64, upper_bound: f64, solve_time: Duration) {
        self.history.push(BendersIteration {
            iteration: self.history.len() + 1,
            lower_bound,
            upper_bound,
            solve_time,
        });
    }

    /// Whether the last recorded iteration closed the gap
    pub fn converged(&self, tolerance: f64) -> bool {
        self.history
            .last()
            .map(|iteration| iteration.gap() <= tolerance)
            .unwrap_or(false)
    }

    /// Write every period's collected operational results back onto the
    /// planning problem, making downstream reporting identical to the
    /// single-system algorithms
    pub fn write_back(&mut self) -> CepResult<()> {
        for period in &mut self.planning.periods {
            write_back_period(period, &self.subproblems, &self.period_map)?;
        }
        Ok(())
    }

    /// Detailed costs of one period: planning-problem fixed costs plus
    /// operational costs merged from the period's subproblems
    pub fn detailed_costs(&mut self, period_index: usize, scaling: f64) -> CepResult<DetailedCosts> {
        let operational =
            aggregate_operational_costs(&self.subproblems, &self.period_map, period_index)?;
        let settings = self.planning.settings.clone();
        let period = self
            .planning
            .period_mut(period_index)
            .ok_or_else(|| CepError::Validation(format!("period {} not found", period_index)))?;
        get_detailed_costs_benders(period, &operational, &settings, scaling)
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Benders Solve Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Periods: {}\n", self.planning.periods.len()));
        s.push_str(&format!("Subproblems: {}\n", self.subproblems.len()));
        s.push_str(&format!("Iterations: {}\n", self.history.len()));
        if let Some(last) = self.history.last() {
            s.push_str(&format!("Lower Bound: {:.2}\n", last.lower_bound));
            s.push_str(&format!("Upper Bound: {:.2}\n", last.upper_bound));
            s.push_str(&format!("Gap: {:.4}%\n", last.gap() * 100.0));
            let total: Duration = self.history.iter().map(|it| it.solve_time).sum();
            s.push_str(&format!("Total Solve Time: {:.2?}\n", total));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cep_core::{CaseSettings, SolutionAlgorithm};

    fn empty_results() -> BendersResults {
        let settings =
            CaseSettings::new(0.05, vec![5], SolutionAlgorithm::Benders).expect("valid settings");
        BendersResults::new(
            Case::new(settings),
            SubproblemsData::default(),
            PeriodSubproblemMap::default(),
        )
    }

    #[test]
    fn test_iteration_gap() {
        let iteration = BendersIteration {
            iteration: 1,
            lower_bound: 95.0,
            upper_bound: 100.0,
            solve_time: Duration::from_secs(1),
        };
        assert!((iteration.gap() - 0.05).abs() < 1e-12);

        let degenerate = BendersIteration::default();
        assert_eq!(degenerate.gap(), 0.0);
    }

    #[test]
    fn test_convergence_tracking() {
        let mut results = empty_results();
        assert!(!results.converged(0.01));

        results.record_iteration(80.0, 100.0, Duration::from_secs(2));
        assert!(!results.converged(0.01));

        results.record_iteration(99.5, 100.0, Duration::from_secs(2));
        assert!(results.converged(0.01));
        assert_eq!(results.history.len(), 2);
        assert_eq!(results.history[1].iteration, 2);
    }

    #[test]
    fn test_summary_contains_bounds() {
        let mut results = empty_results();
        results.record_iteration(95.0, 100.0, Duration::from_millis(1500));
        let summary = results.summary();
        assert!(summary.contains("Iterations: 1"));
        assert!(summary.contains("Lower Bound: 95.00"));
        assert!(summary.contains("Gap: 5.0000%"));
    }
}
