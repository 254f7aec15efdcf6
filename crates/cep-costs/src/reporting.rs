//! Detailed cost breakdown of a solved period.
//!
//! Walks every edge, storage, and node, collects one line item per
//! non-zero cost category, and applies the period's discount multipliers
//! table-wide. The discounted and undiscounted tables share row keys so
//! downstream writers can join them.

use cep_core::{CaseSettings, CepResult, Period};

use crate::costing::{
    fixed_om_cost, fuel_cost, investment_cost, non_served_demand_cost, policy_slack_cost,
    startup_cost, supply_cost, undo_discount_fixed_costs, variable_om_cost, CostPair,
};
use crate::economics::{period_start_years, present_value_annuity_factor, present_value_factor};
use crate::table::{CostCategory, CostTable};

/// Detailed cost breakdown in both representations
#[derive(Debug, Clone, Default)]
pub struct DetailedCosts {
    pub discounted: CostTable,
    pub undiscounted: CostTable,
}

/// Period-level discount multipliers applied after line items are collected
struct PeriodFactors {
    /// Present-value factor for the years before this period
    discount_factor: f64,
    /// Annuity converting a per-year operating cost into a period total
    opex_multiplier: f64,
    period_length: f64,
}

fn period_factors(period_index: usize, settings: &CaseSettings) -> CepResult<PeriodFactors> {
    let rate = settings.discount_rate;
    let length = settings.period_length(period_index)? as f64;
    let starts = period_start_years(&settings.period_lengths);
    let years_before = starts.get(period_index - 1).copied().unwrap_or(0.0);
    Ok(PeriodFactors {
        discount_factor: present_value_factor(rate, years_before),
        opex_multiplier: present_value_annuity_factor(rate, length),
        period_length: length,
    })
}

/// Build the detailed per-line-item cost tables for a solved period.
///
/// Refreshes the cash-flow ledger fields first (which requires the
/// discount pass to have run), collects one line item per non-zero cost
/// category, applies the period discount multipliers by category
/// partition, and finally applies the squared unit-scaling factor.
pub fn get_detailed_costs(
    period: &mut Period,
    settings: &CaseSettings,
    scaling: f64,
) -> CepResult<DetailedCosts> {
    undo_discount_fixed_costs(period, settings)?;

    let mut costs = collect_line_items(period)?;
    apply_period_discounting(&mut costs, period.index, settings)?;
    apply_scaling(&mut costs, scaling);
    Ok(costs)
}

/// Fixed costs of a Benders planning period, read directly from its
/// capacity-bearing components.
///
/// Covers Investment and Fixed OM only; variable costs arrive
/// pre-aggregated from the operational subproblems. Values are raw line
/// items, before period discount multipliers.
pub fn get_fixed_costs_benders(
    period: &mut Period,
    settings: &CaseSettings,
) -> CepResult<DetailedCosts> {
    undo_discount_fixed_costs(period, settings)?;

    let mut costs = DetailedCosts::default();
    for asset in period.capacity_assets() {
        push_pair(
            &mut costs,
            asset.zone(),
            asset.asset_type(),
            CostCategory::Investment,
            investment_cost(asset)?,
        );
        push_pair(
            &mut costs,
            asset.zone(),
            asset.asset_type(),
            CostCategory::FixedOm,
            fixed_om_cost(asset)?,
        );
    }
    Ok(costs)
}

/// Detailed costs of a Benders planning period: fixed costs from the
/// period's own components plus operational costs merged from its
/// subproblems, discounted independently and concatenated.
pub fn get_detailed_costs_benders(
    period: &mut Period,
    operational_costs: &CostTable,
    settings: &CaseSettings,
    scaling: f64,
) -> CepResult<DetailedCosts> {
    let factors = period_factors(period.index, settings)?;
    let mut costs = get_fixed_costs_benders(period, settings)?;
    costs.discounted.scale(factors.discount_factor);

    let mut ops_discounted = operational_costs.clone();
    ops_discounted.scale(factors.discount_factor * factors.opex_multiplier);
    let mut ops_undiscounted = operational_costs.clone();
    ops_undiscounted.scale(factors.period_length);

    costs.discounted.extend_from(&ops_discounted);
    costs.undiscounted.extend_from(&ops_undiscounted);
    apply_scaling(&mut costs, scaling);
    Ok(costs)
}

fn collect_line_items(period: &Period) -> CepResult<DetailedCosts> {
    let mut costs = DetailedCosts::default();

    for edge in &period.edges {
        push_pair(
            &mut costs,
            &edge.zone,
            &edge.asset_type,
            CostCategory::Investment,
            investment_cost(edge)?,
        );
        push_pair(
            &mut costs,
            &edge.zone,
            &edge.asset_type,
            CostCategory::FixedOm,
            fixed_om_cost(edge)?,
        );
        push_flat(
            &mut costs,
            &edge.zone,
            &edge.asset_type,
            CostCategory::VariableOm,
            variable_om_cost(edge),
        );
        push_flat(
            &mut costs,
            &edge.zone,
            &edge.asset_type,
            CostCategory::Fuel,
            fuel_cost(edge, period),
        );
        push_flat(
            &mut costs,
            &edge.zone,
            &edge.asset_type,
            CostCategory::Startup,
            startup_cost(edge),
        );
    }

    for storage in &period.storages {
        push_pair(
            &mut costs,
            &storage.zone,
            &storage.asset_type,
            CostCategory::Investment,
            investment_cost(storage)?,
        );
        push_pair(
            &mut costs,
            &storage.zone,
            &storage.asset_type,
            CostCategory::FixedOm,
            fixed_om_cost(storage)?,
        );
    }

    for node in &period.nodes {
        push_flat(
            &mut costs,
            &node.zone,
            &node.commodity,
            CostCategory::NonServedDemand,
            non_served_demand_cost(node),
        );
        push_flat(
            &mut costs,
            &node.zone,
            &node.commodity,
            CostCategory::Supply,
            supply_cost(node),
        );
        push_flat(
            &mut costs,
            &node.zone,
            &node.commodity,
            CostCategory::UnmetPolicyPenalty,
            policy_slack_cost(node),
        );
    }

    Ok(costs)
}

/// Append a fixed-cost pair, skipping categories that are zero in both
/// representations
fn push_pair(
    costs: &mut DetailedCosts,
    zone: &str,
    asset_type: &str,
    category: CostCategory,
    pair: CostPair,
) {
    if pair.is_zero() {
        return;
    }
    costs.discounted.push(zone, asset_type, category, pair.present_value);
    costs.undiscounted.push(zone, asset_type, category, pair.cash_flow);
}

/// Append an operational cost whose raw value is shared by both tables
fn push_flat(costs: &mut DetailedCosts, zone: &str, asset_type: &str, category: CostCategory, value: f64) {
    if value == 0.0 {
        return;
    }
    costs.discounted.push(zone, asset_type, category, value);
    costs.undiscounted.push(zone, asset_type, category, value);
}

fn apply_period_discounting(
    costs: &mut DetailedCosts,
    period_index: usize,
    settings: &CaseSettings,
) -> CepResult<()> {
    let factors = period_factors(period_index, settings)?;
    costs.discounted.scale_by_category(|category| {
        if category.is_fixed() {
            factors.discount_factor
        } else {
            factors.discount_factor * factors.opex_multiplier
        }
    });
    costs.undiscounted.scale_by_category(|category| {
        if category.is_fixed() {
            1.0
        } else {
            factors.period_length
        }
    });
    Ok(())
}

/// Costs are products of two scaled quantities (price and flow, or cost
/// rate and capacity), so the unit-conversion factor applies squared
fn apply_scaling(costs: &mut DetailedCosts, scaling: f64) {
    if scaling == 1.0 {
        return;
    }
    let squared = scaling * scaling;
    costs.discounted.scale(squared);
    costs.undiscounted.scale(squared);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::discount_fixed_costs;
    use cep_core::{CaseSettings, Edge, Node, SolutionAlgorithm};

    #[test]
    fn test_empty_period_yields_empty_tables() {
        let settings = CaseSettings::new(0.05, vec![5], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = Period::new(1);
        discount_fixed_costs(&mut period, &settings).unwrap();

        let costs = get_detailed_costs(&mut period, &settings, 1.0).unwrap();
        assert!(costs.discounted.is_empty());
        assert!(costs.undiscounted.is_empty());
    }

    #[test]
    fn test_scaling_applies_squared_to_operational_costs() {
        let settings = CaseSettings::new(0.0, vec![1], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = Period::new(1);
        let mut edge = Edge::new("ccgt", "z", "NaturalGasCC", "gas", "elec").with_variable_om(1.0);
        edge.flow = vec![1.0, 2.0, 3.0];
        edge.subperiod_weights = vec![1.0, 1.0, 1.0];
        period.edges.push(edge);

        discount_fixed_costs(&mut period, &settings).unwrap();
        let costs = get_detailed_costs(&mut period, &settings, 2.0).unwrap();

        // raw sum 6.0, times period length 1, times scaling squared
        assert_eq!(costs.undiscounted.rows().len(), 1);
        assert_eq!(costs.undiscounted.rows()[0].value, 24.0);
        assert_eq!(costs.discounted.rows()[0].value, 24.0);
    }

    #[test]
    fn test_detailed_costs_requires_discount_pass() {
        let settings = CaseSettings::new(0.05, vec![5], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = Period::new(1);
        period.edges.push(
            Edge::new("ccgt", "z", "NaturalGasCC", "gas", "elec").with_investment(10.0, 20),
        );
        assert!(get_detailed_costs(&mut period, &settings, 1.0).is_err());
    }

    #[test]
    fn test_node_costs_keyed_by_commodity() {
        let settings = CaseSettings::new(0.0, vec![1], SolutionAlgorithm::Monolithic).unwrap();
        let mut period = Period::new(1);
        let mut node = Node::new("elec_a", "zone_a", "Electricity").with_nsd_segment(100.0, 1.0);
        node.nsd_segments[0].quantity = vec![2.0];
        period.nodes.push(node);

        discount_fixed_costs(&mut period, &settings).unwrap();
        let costs = get_detailed_costs(&mut period, &settings, 1.0).unwrap();

        let row = &costs.discounted.rows()[0];
        assert_eq!(row.zone, "zone_a");
        assert_eq!(row.asset_type, "Electricity");
        assert_eq!(row.category, CostCategory::NonServedDemand);
        assert_eq!(row.value, 200.0);
    }

    #[test]
    fn test_benders_split_matches_single_system() {
        // fixed costs from the planning period plus a collector-provided
        // operational table reproduce the single-system breakdown
        let settings = CaseSettings::new(0.05, vec![5, 5], SolutionAlgorithm::Benders).unwrap();

        let mut full = Period::new(2);
        let mut edge = Edge::new("ccgt", "z", "NaturalGasCC", "gas", "elec")
            .with_investment(10.0, 20)
            .with_variable_om(2.0);
        edge.new_capacity = 1.0;
        edge.flow = vec![3.0];
        edge.subperiod_weights = vec![1.0];
        full.edges.push(edge);

        discount_fixed_costs(&mut full, &settings).unwrap();
        let expected = get_detailed_costs(&mut full, &settings, 1.0).unwrap();

        let mut planning = full.clone();
        planning.edges[0].flow = Vec::new();
        let mut operational = CostTable::new();
        operational.push("z", "NaturalGasCC", CostCategory::VariableOm, 6.0);

        discount_fixed_costs(&mut planning, &settings).unwrap();
        let split =
            get_detailed_costs_benders(&mut planning, &operational, &settings, 1.0).unwrap();

        assert!((split.discounted.total() - expected.discounted.total()).abs() < 1e-9);
        assert!((split.undiscounted.total() - expected.undiscounted.total()).abs() < 1e-9);
    }
}
