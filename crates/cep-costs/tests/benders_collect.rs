//! Benders subproblem collection: scatter-gather modes, deterministic
//! merging, write-back, and cost reconciliation.

use std::time::Duration;

use cep_core::{Case, CaseSettings, CepError, Edge, Node, Period, SolutionAlgorithm};
use cep_costs::{
    aggregate_operational_costs, collect_subproblems, discount_fixed_costs, write_back_period,
    BendersResults, CollectionMode, CostCategory, PeriodSubproblemMap, SeriesMap,
    SubproblemResult,
};

const SUBPERIODS_PER_SUBPROBLEM: usize = 4;

/// Deterministic subproblem results: subproblem `i` covers time indices
/// `[4i, 4i + 4)` of its period's edge, node, and constraint series
fn extract_subproblem(index: usize) -> SubproblemResult {
    let offset = index * SUBPERIODS_PER_SUBPROBLEM;
    let window = |scale: f64| -> SeriesMap {
        (offset..offset + SUBPERIODS_PER_SUBPROBLEM)
            .map(|t| (t, scale * t as f64))
            .collect()
    };

    let mut result = SubproblemResult::new(index);
    result.flows.insert("ccgt".to_string(), window(1.0));
    result
        .non_served_demand
        .insert("elec".to_string(), vec![window(0.1)]);
    result
        .slack_values
        .entry("elec".to_string())
        .or_default()
        .insert("co2_cap".to_string(), window(0.01));
    result
        .duals
        .entry("elec".to_string())
        .or_default()
        .insert("balance".to_string(), window(10.0));
    result
        .operational_costs
        .push("z1", "NaturalGasCC", CostCategory::VariableOm, 1.0 + index as f64);
    result
}

fn planning_period(num_subproblems: usize) -> Period {
    let subperiods = num_subproblems * SUBPERIODS_PER_SUBPROBLEM;
    let mut period = Period::new(1);

    let mut edge = Edge::new("ccgt", "z1", "NaturalGasCC", "gas", "elec");
    edge.subperiod_weights = vec![1.0; subperiods];
    period.edges.push(edge);

    let mut node = Node::new("elec", "z1", "Electricity")
        .with_nsd_segment(1000.0, 0.05)
        .with_policy_slack("co2_cap", 200.0);
    node.subperiod_weights = vec![1.0; subperiods];
    period.nodes.push(node);

    period
}

#[test]
fn local_and_distributed_collection_agree() {
    let extract = |index: usize| Ok(extract_subproblem(index));

    let local = collect_subproblems(6, CollectionMode::Local, extract).unwrap();
    let distributed =
        collect_subproblems(6, CollectionMode::Distributed { workers: 3 }, extract).unwrap();

    assert_eq!(local.len(), distributed.len());
    for (a, b) in local.iter().zip(distributed.iter()) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.flows, b.flows);
        assert_eq!(a.operational_costs, b.operational_costs);
    }

    // more workers than subproblems still covers every index
    let oversubscribed =
        collect_subproblems(2, CollectionMode::Distributed { workers: 8 }, extract).unwrap();
    assert_eq!(oversubscribed.len(), 2);
}

#[test]
fn failed_subproblem_is_fatal_in_both_modes() {
    let extract = |index: usize| {
        if index == 3 {
            Err(CepError::Validation("subproblem 3 infeasible".to_string()))
        } else {
            Ok(extract_subproblem(index))
        }
    };

    assert!(collect_subproblems(5, CollectionMode::Local, extract).is_err());
    assert!(
        collect_subproblems(5, CollectionMode::Distributed { workers: 2 }, extract).is_err()
    );
}

#[test]
fn operational_costs_merge_by_key() {
    // two subproblems of the same period reporting the same (zone, type)
    // sum into a single row
    let data = collect_subproblems(2, CollectionMode::Local, |i| Ok(extract_subproblem(i))).unwrap();
    let map = PeriodSubproblemMap::new(vec![vec![0, 1]]);

    let merged = aggregate_operational_costs(&data, &map, 1).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.rows()[0].category, CostCategory::VariableOm);
    assert_eq!(merged.rows()[0].value, 3.0);
}

#[test]
fn write_back_produces_dense_series() {
    let data = collect_subproblems(2, CollectionMode::Local, |i| Ok(extract_subproblem(i))).unwrap();
    let map = PeriodSubproblemMap::new(vec![vec![0, 1]]);
    let mut period = planning_period(2);

    write_back_period(&mut period, &data, &map).unwrap();

    let edge = period.edge("ccgt").unwrap();
    assert_eq!(edge.flow, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

    let node = period.node("elec").unwrap();
    assert_eq!(node.nsd_segments[0].quantity.len(), 8);
    assert!((node.nsd_segments[0].quantity[5] - 0.5).abs() < 1e-12);
    assert!((node.policy_slacks[0].values[7] - 0.07).abs() < 1e-12);
    assert_eq!(node.duals["balance"].len(), 8);
    assert!((node.duals["balance"][3] - 30.0).abs() < 1e-12);
}

#[test]
fn colliding_time_indices_fail_write_back() {
    // both subproblems claim the same window: disjoint union is violated
    let extract = |index: usize| {
        let mut result = extract_subproblem(index);
        let overlapping: SeriesMap = (0..SUBPERIODS_PER_SUBPROBLEM)
            .map(|t| (t, t as f64))
            .collect();
        result.flows.insert("ccgt".to_string(), overlapping);
        Ok(result)
    };
    let data = collect_subproblems(2, CollectionMode::Local, extract).unwrap();
    let map = PeriodSubproblemMap::new(vec![vec![0, 1]]);
    let mut period = planning_period(2);

    let err = write_back_period(&mut period, &data, &map).unwrap_err();
    assert!(matches!(err, CepError::MergeCollision { .. }));
    // gather failed before anything was written
    assert!(period.edge("ccgt").unwrap().flow.is_empty());
}

#[test]
fn mapping_out_of_range_is_fatal() {
    let data = collect_subproblems(2, CollectionMode::Local, |i| Ok(extract_subproblem(i))).unwrap();
    let map = PeriodSubproblemMap::new(vec![vec![0, 1, 2]]);
    let mut period = planning_period(2);

    let err = write_back_period(&mut period, &data, &map).unwrap_err();
    assert!(matches!(err, CepError::SubproblemIndexOutOfRange { .. }));
}

#[test]
fn benders_results_report_uniformly() {
    let settings = CaseSettings::new(0.0, vec![1], SolutionAlgorithm::Benders).unwrap();
    let mut case = Case::new(settings.clone());
    let mut period = planning_period(2);
    period.edges[0] = Edge::new("ccgt", "z1", "NaturalGasCC", "gas", "elec")
        .with_investment(10.0, 1);
    period.edges[0].new_capacity = 2.0;
    period.edges[0].subperiod_weights = vec![1.0; 8];
    discount_fixed_costs(&mut period, &settings).unwrap();
    case.periods[0] = period;

    let data = collect_subproblems(2, CollectionMode::Local, |i| Ok(extract_subproblem(i))).unwrap();
    let map = PeriodSubproblemMap::new(vec![vec![0, 1]]);

    let mut results = BendersResults::new(case, data, map);
    results.record_iteration(99.0, 100.0, Duration::from_secs(1));
    assert!(results.converged(0.02));

    results.write_back().unwrap();
    assert_eq!(results.planning.periods[0].edges[0].flow.len(), 8);

    // fixed costs from the planning problem, operational from subproblems
    let costs = results.detailed_costs(1, 1.0).unwrap();
    let investment: f64 = costs
        .discounted
        .rows()
        .iter()
        .filter(|r| r.category == CostCategory::Investment)
        .map(|r| r.value)
        .sum();
    let variable: f64 = costs
        .discounted
        .rows()
        .iter()
        .filter(|r| r.category == CostCategory::VariableOm)
        .map(|r| r.value)
        .sum();
    assert!((investment - 20.0).abs() < 1e-9);
    assert!((variable - 3.0).abs() < 1e-9);
}
