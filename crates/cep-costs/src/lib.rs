//! # cep-costs: Cost Accounting for Capacity-Expansion Models
//!
//! This crate computes, discounts, aggregates, and validates the costs of
//! a solved multi-period capacity-expansion system. The same formulas
//! serve three solution algorithms, which must stay numerically
//! consistent with each other:
//!
//! | Algorithm | Horizon seen by a period | Operational costs from |
//! |-----------|--------------------------|------------------------|
//! | Monolithic | full remaining horizon  | the period itself      |
//! | Myopic     | the period's own length | the period itself      |
//! | Benders    | full remaining horizon  | operational subproblems |
//!
//! ## Pipeline
//!
//! 1. [`costing::discount_fixed_costs`] writes present-value cost rates
//!    onto every capacity-bearing component of a period;
//!    [`costing::undo_discount_fixed_costs`] derives the cash-flow rates.
//! 2. [`reporting::get_detailed_costs`] walks the period and produces a
//!    discounted and an undiscounted line-item table (Benders planning
//!    periods use [`reporting::get_detailed_costs_benders`], combining
//!    their own fixed costs with subproblem operational costs).
//! 3. [`table::aggregate_by_type`] / [`table::aggregate_by_zone`] group
//!    the line items; [`table::add_total_row`] appends synthetic totals.
//! 4. [`validate::validate_total_cost`] cross-checks the grand total
//!    against the solver's objective and warns on a mismatch.
//!
//! Myopic runs deliberately omit investment value beyond each period's
//! horizon; [`costing::finalize_myopic_costs`] adds it back once, for
//! fair comparison against the full-foresight algorithms.
//!
//! The [`benders`] module owns subproblem result collection: scatter-
//! gather over a worker pool, deterministic disjoint-union merging, and
//! write-back onto the planning problem.

pub mod benders;
pub mod costing;
pub mod economics;
pub mod reporting;
pub mod table;
pub mod validate;

pub use benders::{
    aggregate_operational_costs, collect_subproblems, merge_worker_batches, write_back_period,
    BendersIteration, BendersResults, CollectionMode, PeriodSubproblemMap, SeriesMap,
    SubproblemResult, SubproblemsData, WorkerBatch,
};
pub use costing::{
    add_costs_not_seen_by_myopic, discount_fixed_costs, finalize_myopic_costs, fixed_om_cost,
    fuel_cost, investment_cost, non_served_demand_cost, policy_slack_cost, startup_cost,
    supply_cost, undo_discount_fixed_costs, variable_om_cost, CostPair,
};
pub use economics::{
    applicable_horizon, capital_recovery_factor, period_start_years, present_value_annuity_factor,
    present_value_factor, years_remaining,
};
pub use reporting::{
    get_detailed_costs, get_detailed_costs_benders, get_fixed_costs_benders, DetailedCosts,
};
pub use table::{
    add_total_row, aggregate_by_type, aggregate_by_zone, AggregateRow, CostCategory, CostLineItem,
    CostTable, ReportCategory,
};
pub use validate::{validate_total_cost, CostValidation};
