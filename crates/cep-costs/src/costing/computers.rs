//! Cost computers for solved components.
//!
//! Capacity costs (investment, fixed O&M) read per-unit rates from the
//! component's ledger and fail if the discounting passes have not run;
//! operational costs are subperiod-weighted sums over solved quantities
//! and gate to exact zeros when the component carries no such cost.

use cep_core::{CapacityAsset, CepResult, Edge, Node, Period};

/// A cost in both representations: present value at the period start and
/// undiscounted within-period cash flow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostPair {
    pub present_value: f64,
    pub cash_flow: f64,
}

impl CostPair {
    pub const ZERO: CostPair = CostPair {
        present_value: 0.0,
        cash_flow: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        self.present_value == 0.0 && self.cash_flow == 0.0
    }
}

/// Investment cost of a capacity-expandable asset.
///
/// Zero for assets without expansion. An unpopulated ledger is an error:
/// computing a cost before discounting is an ordering bug, not a
/// zero-cost case.
pub fn investment_cost<A: CapacityAsset + ?Sized>(asset: &A) -> CepResult<CostPair> {
    if !asset.capacity_expandable() {
        return Ok(CostPair::ZERO);
    }
    let new_capacity = asset.new_capacity();
    Ok(CostPair {
        present_value: asset.ledger().pv_investment(asset.name())? * new_capacity,
        cash_flow: asset.ledger().cf_investment(asset.name())? * new_capacity,
    })
}

/// Fixed O&M cost, charged on total capacity rather than new capacity
pub fn fixed_om_cost<A: CapacityAsset + ?Sized>(asset: &A) -> CepResult<CostPair> {
    if asset.fixed_om_rate() <= 0.0 {
        return Ok(CostPair::ZERO);
    }
    let capacity = asset.capacity();
    Ok(CostPair {
        present_value: asset.ledger().pv_fixed_om(asset.name())? * capacity,
        cash_flow: asset.ledger().cf_fixed_om(asset.name())? * capacity,
    })
}

/// Variable O&M cost: weighted flow times the O&M rate
pub fn variable_om_cost(edge: &Edge) -> f64 {
    if edge.variable_om_cost <= 0.0 {
        return 0.0;
    }
    edge.flow
        .iter()
        .enumerate()
        .map(|(t, flow)| edge.subperiod_weight(t) * edge.variable_om_cost * flow)
        .sum()
}

/// Fuel cost: weighted flow priced at the edge's origin node.
///
/// Zero when the origin is not a priced node or carries no price series.
pub fn fuel_cost(edge: &Edge, period: &Period) -> f64 {
    let price = match period.node(&edge.from_node).and_then(|n| n.price.as_ref()) {
        Some(price) => price,
        None => return 0.0,
    };
    edge.flow
        .iter()
        .enumerate()
        .map(|(t, flow)| {
            edge.subperiod_weight(t) * price.get(t).copied().unwrap_or(0.0) * flow
        })
        .sum()
}

/// Startup cost for unit-commitment edges; identically zero otherwise
pub fn startup_cost(edge: &Edge) -> f64 {
    let uc = match &edge.unit_commitment {
        Some(uc) => uc,
        None => return 0.0,
    };
    if uc.startup_cost <= 0.0 {
        return 0.0;
    }
    uc.startups
        .iter()
        .enumerate()
        .map(|(t, started)| {
            edge.subperiod_weight(t) * uc.startup_cost * uc.capacity_size * started
        })
        .sum()
}

/// Non-served demand penalty summed over all of a node's segments
pub fn non_served_demand_cost(node: &Node) -> f64 {
    node.nsd_segments
        .iter()
        .map(|segment| {
            segment
                .quantity
                .iter()
                .enumerate()
                .map(|(t, q)| node.subperiod_weight(t) * segment.price * q)
                .sum::<f64>()
        })
        .sum()
}

/// Exogenous supply cost summed over all of a node's segments
pub fn supply_cost(node: &Node) -> f64 {
    node.supply_segments
        .iter()
        .map(|segment| {
            segment
                .quantity
                .iter()
                .enumerate()
                .map(|(t, q)| node.subperiod_weight(t) * segment.cost * q)
                .sum::<f64>()
        })
        .sum()
}

/// Penalty paid on policy-constraint slack variables
pub fn policy_slack_cost(node: &Node) -> f64 {
    node.policy_slacks
        .iter()
        .map(|slack| {
            if slack.penalty <= 0.0 {
                return 0.0;
            }
            slack
                .values
                .iter()
                .enumerate()
                .map(|(t, v)| node.subperiod_weight(t) * slack.penalty * v)
                .sum::<f64>()
        })
        .sum()
}
