//! Scatter-gather collection of subproblem results and write-back onto
//! the planning problem.
//!
//! Workers return immutable result batches; the coordinator merges them
//! with pure functions. Merge semantics are disjoint union: subproblems
//! of one period never share time indices, so any duplicate key is a
//! data bug and fails the whole collection. No partial results survive.

use std::collections::BTreeMap;

use cep_core::{CepError, CepResult, Period};
use rayon::prelude::*;

use super::subproblems::{PeriodSubproblemMap, SeriesMap, SubproblemResult, SubproblemsData};
use crate::table::CostTable;

/// How subproblem results are gathered after a Benders iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMode {
    /// Sequential extraction in the calling thread
    Local,
    /// Subproblems partitioned across a fixed pool of workers, one
    /// blocking gather round-trip per worker
    Distributed { workers: usize },
}

/// Results returned by one worker in a single gather round-trip
#[derive(Debug, Clone, Default)]
pub struct WorkerBatch {
    pub worker: usize,
    pub results: Vec<SubproblemResult>,
}

/// Gather all subproblem results.
///
/// `extract` reads one solved subproblem's tables. A failure in any
/// extraction is fatal and nothing is returned. Both modes produce
/// identical output for the same inputs.
pub fn collect_subproblems<F>(
    num_subproblems: usize,
    mode: CollectionMode,
    extract: F,
) -> CepResult<SubproblemsData>
where
    F: Fn(usize) -> CepResult<SubproblemResult> + Sync,
{
    match mode {
        CollectionMode::Local => {
            let mut results = Vec::with_capacity(num_subproblems);
            for index in 0..num_subproblems {
                results.push(extract(index)?);
            }
            SubproblemsData::from_results(results)
        }
        CollectionMode::Distributed { workers } => {
            let batches = scatter_gather(num_subproblems, workers, &extract)?;
            merge_worker_batches(batches)
        }
    }
}

/// One round-trip per worker: each worker extracts all of its local
/// subproblems before replying
fn scatter_gather<F>(
    num_subproblems: usize,
    workers: usize,
    extract: &F,
) -> CepResult<Vec<WorkerBatch>>
where
    F: Fn(usize) -> CepResult<SubproblemResult> + Sync,
{
    if workers == 0 {
        return Err(CepError::Config(
            "distributed collection requires at least one worker".to_string(),
        ));
    }
    let partitions = partition_indices(num_subproblems, workers);
    partitions
        .into_par_iter()
        .enumerate()
        .map(|(worker, indices)| {
            let mut results = Vec::with_capacity(indices.len());
            for index in indices {
                results.push(extract(index)?);
            }
            Ok(WorkerBatch { worker, results })
        })
        .collect()
}

/// Contiguous near-even partition of `0..n` across `workers` slots
fn partition_indices(n: usize, workers: usize) -> Vec<Vec<usize>> {
    let mut partitions = vec![Vec::new(); workers];
    let base = n / workers;
    let extra = n % workers;
    let mut next = 0;
    for (worker, partition) in partitions.iter_mut().enumerate() {
        let count = base + usize::from(worker < extra);
        partition.extend(next..next + count);
        next += count;
    }
    partitions
}

/// Pure merge of per-worker batches into the flat collection.
/// A duplicate or missing subproblem index is a data-shape error.
pub fn merge_worker_batches(batches: Vec<WorkerBatch>) -> CepResult<SubproblemsData> {
    let results: Vec<SubproblemResult> =
        batches.into_iter().flat_map(|batch| batch.results).collect();
    SubproblemsData::from_results(results)
}

/// Sum the operational cost tables of one period's subproblems into a
/// single table keyed by (zone, type, category)
pub fn aggregate_operational_costs(
    data: &SubproblemsData,
    map: &PeriodSubproblemMap,
    period_index: usize,
) -> CepResult<CostTable> {
    let mut merged = CostTable::new();
    for &index in map.subproblems_for_period(period_index) {
        merged.merge_summed(&data.get(index)?.operational_costs);
    }
    Ok(merged)
}

/// Disjoint union of time-indexed values. Any duplicate time index is a
/// collision, even when the values agree.
fn merge_series(into: &mut SeriesMap, from: &SeriesMap, key: &str) -> CepResult<()> {
    for (&time, &value) in from {
        if let Some(&existing) = into.get(&time) {
            return Err(CepError::MergeCollision {
                key: key.to_string(),
                time,
                existing,
                incoming: value,
            });
        }
        into.insert(time, value);
    }
    Ok(())
}

/// Merged per-component series of one period, staged before write-back
#[derive(Debug, Default)]
struct MergedPeriod {
    flows: BTreeMap<String, SeriesMap>,
    storage_levels: BTreeMap<String, SeriesMap>,
    non_served_demand: BTreeMap<String, Vec<SeriesMap>>,
    slack_values: BTreeMap<(String, String), SeriesMap>,
    duals: BTreeMap<(String, String), SeriesMap>,
}

fn merge_period_results(
    period_index: usize,
    data: &SubproblemsData,
    map: &PeriodSubproblemMap,
) -> CepResult<MergedPeriod> {
    let mut merged = MergedPeriod::default();
    for &index in map.subproblems_for_period(period_index) {
        let result = data.get(index)?;
        for (edge, series) in &result.flows {
            merge_series(merged.flows.entry(edge.clone()).or_default(), series, edge)?;
        }
        for (storage, series) in &result.storage_levels {
            merge_series(
                merged.storage_levels.entry(storage.clone()).or_default(),
                series,
                storage,
            )?;
        }
        for (node, segments) in &result.non_served_demand {
            let target = merged.non_served_demand.entry(node.clone()).or_default();
            if target.len() < segments.len() {
                target.resize(segments.len(), SeriesMap::new());
            }
            for (segment, series) in segments.iter().enumerate() {
                let key = format!("{}/nsd[{}]", node, segment);
                merge_series(&mut target[segment], series, &key)?;
            }
        }
        for (node, by_policy) in &result.slack_values {
            for (policy, series) in by_policy {
                let key = format!("{}/{}", node, policy);
                merge_series(
                    merged
                        .slack_values
                        .entry((node.clone(), policy.clone()))
                        .or_default(),
                    series,
                    &key,
                )?;
            }
        }
        for (node, by_constraint) in &result.duals {
            for (constraint, series) in by_constraint {
                let key = format!("{}/{}", node, constraint);
                merge_series(
                    merged
                        .duals
                        .entry((node.clone(), constraint.clone()))
                        .or_default(),
                    series,
                    &key,
                )?;
            }
        }
    }
    Ok(merged)
}

/// Dense length of a component's time dimension: its subperiod-weight
/// count, or past the last collected index when it carries no weights
fn dense_len(weights: &[f64], series: &SeriesMap) -> usize {
    if !weights.is_empty() {
        weights.len()
    } else {
        series.keys().next_back().map(|&t| t + 1).unwrap_or(0)
    }
}

fn to_dense(series: &SeriesMap, len: usize, what: &str) -> CepResult<Vec<f64>> {
    let mut dense = vec![0.0; len];
    for (&time, &value) in series {
        if time >= len {
            return Err(CepError::Validation(format!(
                "time index {} out of range for `{}` ({} subperiods)",
                time, what, len
            )));
        }
        dense[time] = value;
    }
    Ok(dense)
}

/// Write one period's collected operational results back onto the
/// planning problem's components, converting time-keyed maps to the
/// dense arrays the model representation expects.
///
/// All merging and dense conversion happens before the first component is
/// touched, so a collision or shape error leaves the period unmodified.
pub fn write_back_period(
    period: &mut Period,
    data: &SubproblemsData,
    map: &PeriodSubproblemMap,
) -> CepResult<()> {
    map.validate(data.len())?;
    let merged = merge_period_results(period.index, data, map)?;

    // stage dense conversions against the current component shapes
    let mut staged_flows = Vec::new();
    for (edge_name, series) in &merged.flows {
        let edge = period.edge(edge_name).ok_or_else(|| {
            CepError::Validation(format!("subproblem flow for unknown edge `{}`", edge_name))
        })?;
        let len = dense_len(&edge.subperiod_weights, series);
        staged_flows.push((edge_name.clone(), to_dense(series, len, edge_name)?));
    }

    let mut staged_levels = Vec::new();
    for (storage_name, series) in &merged.storage_levels {
        let storage = period.storage(storage_name).ok_or_else(|| {
            CepError::Validation(format!(
                "subproblem storage level for unknown storage `{}`",
                storage_name
            ))
        })?;
        let len = dense_len(&storage.subperiod_weights, series);
        staged_levels.push((storage_name.clone(), to_dense(series, len, storage_name)?));
    }

    let mut staged_nsd = Vec::new();
    for (node_name, segments) in &merged.non_served_demand {
        let node = period.node(node_name).ok_or_else(|| {
            CepError::Validation(format!(
                "subproblem non-served demand for unknown node `{}`",
                node_name
            ))
        })?;
        if node.nsd_segments.len() < segments.len() {
            return Err(CepError::Validation(format!(
                "subproblems report {} non-served-demand segments for `{}`, node has {}",
                segments.len(),
                node_name,
                node.nsd_segments.len()
            )));
        }
        for (segment, series) in segments.iter().enumerate() {
            let what = format!("{}/nsd[{}]", node_name, segment);
            let len = dense_len(&node.subperiod_weights, series);
            staged_nsd.push((node_name.clone(), segment, to_dense(series, len, &what)?));
        }
    }

    let mut staged_slacks = Vec::new();
    for ((node_name, policy), series) in &merged.slack_values {
        let node = period.node(node_name).ok_or_else(|| {
            CepError::Validation(format!(
                "subproblem slack values for unknown node `{}`",
                node_name
            ))
        })?;
        if !node.policy_slacks.iter().any(|s| &s.policy == policy) {
            return Err(CepError::Validation(format!(
                "slack values for unknown policy `{}` on node `{}`",
                policy, node_name
            )));
        }
        let what = format!("{}/{}", node_name, policy);
        let len = dense_len(&node.subperiod_weights, series);
        staged_slacks.push((node_name.clone(), policy.clone(), to_dense(series, len, &what)?));
    }

    let mut staged_duals = Vec::new();
    for ((node_name, constraint), series) in &merged.duals {
        let node = period.node(node_name).ok_or_else(|| {
            CepError::Validation(format!(
                "subproblem duals for unknown node `{}`",
                node_name
            ))
        })?;
        let what = format!("{}/{}", node_name, constraint);
        let len = dense_len(&node.subperiod_weights, series);
        staged_duals.push((node_name.clone(), constraint.clone(), to_dense(series, len, &what)?));
    }

    // write-after-gather: every lookup above succeeded, so these cannot fail
    for (edge_name, dense) in staged_flows {
        if let Some(edge) = period.edge_mut(&edge_name) {
            edge.flow = dense;
        }
    }
    for (storage_name, dense) in staged_levels {
        if let Some(storage) = period.storage_mut(&storage_name) {
            storage.storage_level = dense;
        }
    }
    for (node_name, segment, dense) in staged_nsd {
        if let Some(node) = period.node_mut(&node_name) {
            node.nsd_segments[segment].quantity = dense;
        }
    }
    for (node_name, policy, dense) in staged_slacks {
        if let Some(node) = period.node_mut(&node_name) {
            if let Some(slack) = node.policy_slacks.iter_mut().find(|s| s.policy == policy) {
                slack.values = dense;
            }
        }
    }
    for (node_name, constraint, dense) in staged_duals {
        if let Some(node) = period.node_mut(&node_name) {
            node.duals.insert(constraint, dense);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_indices_covers_everything() {
        let partitions = partition_indices(7, 3);
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[0], vec![0, 1, 2]);
        assert_eq!(partitions[1], vec![3, 4]);
        assert_eq!(partitions[2], vec![5, 6]);

        // more workers than subproblems leaves trailing workers idle
        let sparse = partition_indices(2, 4);
        assert_eq!(sparse[0], vec![0]);
        assert_eq!(sparse[1], vec![1]);
        assert!(sparse[2].is_empty() && sparse[3].is_empty());
    }

    #[test]
    fn test_merge_series_disjoint_union() {
        let mut into: SeriesMap = [(0, 1.0), (1, 2.0)].into_iter().collect();
        let from: SeriesMap = [(2, 3.0)].into_iter().collect();
        merge_series(&mut into, &from, "edge").unwrap();
        assert_eq!(into.len(), 3);

        let colliding: SeriesMap = [(1, 9.0)].into_iter().collect();
        let err = merge_series(&mut into, &colliding, "edge").unwrap_err();
        assert!(err.to_string().contains("time index 1"));
    }

    #[test]
    fn test_merge_series_rejects_agreeing_duplicates() {
        let mut into: SeriesMap = [(0, 1.0)].into_iter().collect();
        let same: SeriesMap = [(0, 1.0)].into_iter().collect();
        assert!(merge_series(&mut into, &same, "edge").is_err());
    }

    #[test]
    fn test_to_dense_range_check() {
        let series: SeriesMap = [(0, 1.0), (2, 3.0)].into_iter().collect();
        assert_eq!(to_dense(&series, 4, "edge").unwrap(), vec![1.0, 0.0, 3.0, 0.0]);
        assert!(to_dense(&series, 2, "edge").is_err());
    }
}
