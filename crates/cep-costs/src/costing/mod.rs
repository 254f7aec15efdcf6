//! Per-component cost computation and the discounting state manager.
//!
//! [`discounting`] mutates the cost ledgers of every capacity-bearing
//! component in a period; [`computers`] reads those ledgers together with
//! solved decision values to produce per-component costs. The ledger's
//! basis tag enforces the pass ordering between the two.

mod computers;
mod discounting;

pub use computers::{
    fixed_om_cost, fuel_cost, investment_cost, non_served_demand_cost, policy_slack_cost,
    startup_cost, supply_cost, variable_om_cost, CostPair,
};
pub use discounting::{
    add_costs_not_seen_by_myopic, discount_fixed_costs, finalize_myopic_costs,
    undo_discount_fixed_costs,
};
