//! Subproblem result containers and the period-to-subproblem mapping.

use std::collections::BTreeMap;

use cep_core::{CepError, CepResult};

use crate::table::CostTable;

/// Solved values keyed by time index within a subproblem's window.
/// Ordered so merges and write-back iterate deterministically.
pub type SeriesMap = BTreeMap<usize, f64>;

/// Everything one operational subproblem reports back after solving
#[derive(Debug, Clone, Default)]
pub struct SubproblemResult {
    /// Position in the flat subproblem list
    pub index: usize,
    /// Edge flows by edge name
    pub flows: BTreeMap<String, SeriesMap>,
    /// Storage levels by storage name
    pub storage_levels: BTreeMap<String, SeriesMap>,
    /// Non-served demand by node name, one series per segment
    pub non_served_demand: BTreeMap<String, Vec<SeriesMap>>,
    /// Pre-aggregated operational costs of this subproblem
    pub operational_costs: CostTable,
    /// Policy slack values by node name, then policy identifier
    pub slack_values: BTreeMap<String, BTreeMap<String, SeriesMap>>,
    /// Constraint duals by node name, then constraint identifier
    pub duals: BTreeMap<String, BTreeMap<String, SeriesMap>>,
}

impl SubproblemResult {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }
}

/// Flat, index-aligned collection of subproblem results
#[derive(Debug, Clone, Default)]
pub struct SubproblemsData {
    results: Vec<SubproblemResult>,
}

impl SubproblemsData {
    /// Build from results that may arrive out of order.
    ///
    /// Every index in `0..n` must appear exactly once; gaps and
    /// duplicates are data-shape errors.
    pub fn from_results(mut results: Vec<SubproblemResult>) -> CepResult<Self> {
        results.sort_by_key(|r| r.index);
        for (expected, result) in results.iter().enumerate() {
            if result.index != expected {
                return Err(CepError::Validation(format!(
                    "subproblem results do not form a contiguous index range: expected {}, found {}",
                    expected, result.index
                )));
            }
        }
        Ok(Self { results })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> CepResult<&SubproblemResult> {
        self.results
            .get(index)
            .ok_or(CepError::SubproblemIndexOutOfRange {
                index,
                len: self.results.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubproblemResult> + '_ {
        self.results.iter()
    }
}

/// Assignment of flat subproblem indices to (1-based) planning periods
#[derive(Debug, Clone, Default)]
pub struct PeriodSubproblemMap {
    assignments: Vec<Vec<usize>>,
}

impl PeriodSubproblemMap {
    /// `assignments[p]` lists the subproblem indices of period `p + 1`
    pub fn new(assignments: Vec<Vec<usize>>) -> Self {
        Self { assignments }
    }

    /// Check that every referenced index exists and no subproblem is
    /// claimed by two periods
    pub fn validate(&self, num_subproblems: usize) -> CepResult<()> {
        let mut seen = vec![false; num_subproblems];
        for indices in &self.assignments {
            for &index in indices {
                if index >= num_subproblems {
                    return Err(CepError::SubproblemIndexOutOfRange {
                        index,
                        len: num_subproblems,
                    });
                }
                if seen[index] {
                    return Err(CepError::Validation(format!(
                        "subproblem {} assigned to more than one period",
                        index
                    )));
                }
                seen[index] = true;
            }
        }
        Ok(())
    }

    pub fn num_periods(&self) -> usize {
        self.assignments.len()
    }

    /// Subproblem indices belonging to the given (1-based) period
    pub fn subproblems_for_period(&self, period_index: usize) -> &[usize] {
        period_index
            .checked_sub(1)
            .and_then(|i| self.assignments.get(i))
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_results_sorts_and_checks_contiguity() {
        let results = vec![
            SubproblemResult::new(2),
            SubproblemResult::new(0),
            SubproblemResult::new(1),
        ];
        let data = SubproblemsData::from_results(results).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.get(2).unwrap().index, 2);

        let gapped = vec![SubproblemResult::new(0), SubproblemResult::new(2)];
        assert!(SubproblemsData::from_results(gapped).is_err());

        let duplicated = vec![
            SubproblemResult::new(0),
            SubproblemResult::new(1),
            SubproblemResult::new(1),
        ];
        assert!(SubproblemsData::from_results(duplicated).is_err());
    }

    #[test]
    fn test_get_out_of_range() {
        let data = SubproblemsData::from_results(vec![SubproblemResult::new(0)]).unwrap();
        let err = data.get(5).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_period_map_partition() {
        let map = PeriodSubproblemMap::new(vec![vec![0, 1], vec![2, 3]]);
        assert!(map.validate(4).is_ok());
        assert_eq!(map.subproblems_for_period(1), &[0, 1]);
        assert_eq!(map.subproblems_for_period(2), &[2, 3]);
        assert!(map.subproblems_for_period(3).is_empty());
        assert!(map.subproblems_for_period(0).is_empty());
    }

    #[test]
    fn test_period_map_rejects_bad_shapes() {
        let out_of_range = PeriodSubproblemMap::new(vec![vec![0, 4]]);
        assert!(out_of_range.validate(4).is_err());

        let double_claimed = PeriodSubproblemMap::new(vec![vec![0, 1], vec![1]]);
        assert!(double_claimed.validate(4).is_err());
    }
}
