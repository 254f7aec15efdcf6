//! Capacity-bearing assets and their per-period cost ledgers.
//!
//! Edges and storages carry capacity decisions and two alternate views of
//! the same period's cost rates: a present-value view (`pv_period_*`) and
//! an undiscounted cash-flow view (`cf_period_*`). Both views derive from
//! the same annuity base and are populated by the discounting passes; the
//! [`CostBasis`] tag makes "cost read before discounting" a checked
//! precondition instead of a silent zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CepError, CepResult};

/// Freshness of the two cost representations stored on a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostBasis {
    /// No discounting pass has run; neither representation is readable
    #[default]
    Stale,
    /// The discount pass ran; `pv_period_*` rates are fresh
    Discounted,
    /// The undiscount pass ran after the discount pass; both
    /// representations are fresh
    Undiscounted,
}

/// Per-period cost rates of a capacity-bearing component.
///
/// Rates are per unit of capacity (investment, fixed O&M) or per unit of
/// flow (variable O&M). The cost computers multiply them by the solved
/// capacity and flow quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLedger {
    basis: CostBasis,
    pv_investment: f64,
    pv_fixed_om: f64,
    pv_variable_om: f64,
    cf_investment: f64,
    cf_fixed_om: f64,
    cf_variable_om: f64,
    myopic_correction_applied: bool,
}

impl CostLedger {
    pub fn basis(&self) -> CostBasis {
        self.basis
    }

    /// Record the present-value rates produced by the discount pass.
    ///
    /// Invalidates previously computed cash-flow rates and re-arms the
    /// myopic finalize guard: the rates are recomputed from scratch, so a
    /// fresh correction is allowed again.
    pub fn record_discounted(&mut self, pv_investment: f64, pv_fixed_om: f64, pv_variable_om: f64) {
        self.pv_investment = pv_investment;
        self.pv_fixed_om = pv_fixed_om;
        self.pv_variable_om = pv_variable_om;
        self.cf_investment = 0.0;
        self.cf_fixed_om = 0.0;
        self.cf_variable_om = 0.0;
        self.basis = CostBasis::Discounted;
        self.myopic_correction_applied = false;
    }

    /// Record the cash-flow rates produced by the undiscount pass.
    ///
    /// The discount pass must have run first; the cash-flow view is
    /// derived from the present-value view, not an independent source.
    pub fn record_undiscounted(
        &mut self,
        component: &str,
        cf_investment: f64,
        cf_fixed_om: f64,
        cf_variable_om: f64,
    ) -> CepResult<()> {
        if self.basis == CostBasis::Stale {
            return Err(CepError::CostBasisNotReady {
                component: component.to_string(),
                field: "pv_period_investment_cost",
            });
        }
        self.cf_investment = cf_investment;
        self.cf_fixed_om = cf_fixed_om;
        self.cf_variable_om = cf_variable_om;
        self.basis = CostBasis::Undiscounted;
        Ok(())
    }

    fn read_pv(&self, component: &str, field: &'static str, value: f64) -> CepResult<f64> {
        match self.basis {
            CostBasis::Stale => Err(CepError::CostBasisNotReady {
                component: component.to_string(),
                field,
            }),
            CostBasis::Discounted | CostBasis::Undiscounted => Ok(value),
        }
    }

    fn read_cf(&self, component: &str, field: &'static str, value: f64) -> CepResult<f64> {
        match self.basis {
            CostBasis::Undiscounted => Ok(value),
            CostBasis::Stale | CostBasis::Discounted => Err(CepError::CostBasisNotReady {
                component: component.to_string(),
                field,
            }),
        }
    }

    /// Present value at period start of one unit of new capacity
    pub fn pv_investment(&self, component: &str) -> CepResult<f64> {
        self.read_pv(component, "pv_period_investment_cost", self.pv_investment)
    }

    /// Present value at period start of one unit-year of fixed O&M
    pub fn pv_fixed_om(&self, component: &str) -> CepResult<f64> {
        self.read_pv(component, "pv_period_fixed_om_cost", self.pv_fixed_om)
    }

    /// Present value at period start of one unit of variable O&M rate
    pub fn pv_variable_om(&self, component: &str) -> CepResult<f64> {
        self.read_pv(component, "pv_period_variable_om_cost", self.pv_variable_om)
    }

    /// Undiscounted cash flow of one unit of new capacity over the horizon
    pub fn cf_investment(&self, component: &str) -> CepResult<f64> {
        self.read_cf(component, "cf_period_investment_cost", self.cf_investment)
    }

    /// Undiscounted period total of one unit-year of fixed O&M
    pub fn cf_fixed_om(&self, component: &str) -> CepResult<f64> {
        self.read_cf(component, "cf_period_fixed_om_cost", self.cf_fixed_om)
    }

    /// Undiscounted period total of one unit of variable O&M rate
    pub fn cf_variable_om(&self, component: &str) -> CepResult<f64> {
        self.read_cf(component, "cf_period_variable_om_cost", self.cf_variable_om)
    }

    /// One-shot additive correction used when finalizing myopic results.
    ///
    /// A second application without an intervening discount pass is an
    /// error rather than a silent double-add.
    pub fn apply_myopic_correction(&mut self, component: &str, delta: f64) -> CepResult<()> {
        if self.basis == CostBasis::Stale {
            return Err(CepError::CostBasisNotReady {
                component: component.to_string(),
                field: "pv_period_investment_cost",
            });
        }
        if self.myopic_correction_applied {
            return Err(CepError::MyopicCorrectionApplied {
                component: component.to_string(),
            });
        }
        self.pv_investment += delta;
        self.myopic_correction_applied = true;
        Ok(())
    }

    /// Reset the ledger to the stale state
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }
}

/// Unit-commitment data for edges with startup costs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCommitment {
    /// Startup cost rate per unit size per start
    pub startup_cost: f64,
    /// Size of a single committed unit
    pub capacity_size: f64,
    /// Startup indicator per subperiod (fractional under relaxation)
    pub startups: Vec<f64>,
}

/// A directed flow of one commodity between two nodes, carrying the
/// capacity and operational decisions of the asset it represents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub name: String,
    pub zone: String,
    /// Asset type used for reporting, e.g. "NaturalGasCC"
    pub asset_type: String,
    pub from_node: String,
    pub to_node: String,
    /// Whether the solver may build new capacity on this edge
    pub capacity_expandable: bool,
    pub existing_capacity: f64,
    /// Capacity built this period (decision value, filled after solve)
    pub new_capacity: f64,
    /// Capacity retired this period (decision value, filled after solve)
    pub retired_capacity: f64,
    /// Annualized investment cost per unit of new capacity
    pub annualized_investment_cost: f64,
    /// Years over which the investment annuity is amortized
    pub capital_recovery_period: u32,
    /// Fixed O&M cost per unit of capacity per year
    pub fixed_om_cost: f64,
    /// Variable O&M cost per unit of flow
    pub variable_om_cost: f64,
    pub unit_commitment: Option<UnitCommitment>,
    /// Solved flow per subperiod
    pub flow: Vec<f64>,
    /// Weight rescaling each sampled subperiod to a full year
    pub subperiod_weights: Vec<f64>,
    pub ledger: CostLedger,
}

impl Edge {
    pub fn new(
        name: impl Into<String>,
        zone: impl Into<String>,
        asset_type: impl Into<String>,
        from_node: impl Into<String>,
        to_node: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            asset_type: asset_type.into(),
            from_node: from_node.into(),
            to_node: to_node.into(),
            ..Default::default()
        }
    }

    /// Set existing capacity
    pub fn with_existing_capacity(mut self, capacity: f64) -> Self {
        self.existing_capacity = capacity;
        self
    }

    /// Make the edge capacity-expandable with the given investment terms
    pub fn with_investment(mut self, annualized_cost: f64, capital_recovery_period: u32) -> Self {
        self.capacity_expandable = true;
        self.annualized_investment_cost = annualized_cost;
        self.capital_recovery_period = capital_recovery_period;
        self
    }

    /// Set the fixed O&M rate
    pub fn with_fixed_om(mut self, rate: f64) -> Self {
        self.fixed_om_cost = rate;
        self
    }

    /// Set the variable O&M rate
    pub fn with_variable_om(mut self, rate: f64) -> Self {
        self.variable_om_cost = rate;
        self
    }

    /// Attach unit-commitment data
    pub fn with_unit_commitment(mut self, unit_commitment: UnitCommitment) -> Self {
        self.unit_commitment = Some(unit_commitment);
        self
    }

    /// Total capacity after this period's build and retirement decisions
    pub fn capacity(&self) -> f64 {
        self.existing_capacity + self.new_capacity - self.retired_capacity
    }

    /// Weight of subperiod `t`; unweighted subperiods count as one year-hour
    pub fn subperiod_weight(&self, t: usize) -> f64 {
        self.subperiod_weights.get(t).copied().unwrap_or(1.0)
    }
}

/// A storage asset with capacity decisions and a solved level trajectory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub name: String,
    pub zone: String,
    pub asset_type: String,
    pub capacity_expandable: bool,
    pub existing_capacity: f64,
    pub new_capacity: f64,
    pub retired_capacity: f64,
    pub annualized_investment_cost: f64,
    pub capital_recovery_period: u32,
    pub fixed_om_cost: f64,
    /// Solved storage level per subperiod
    pub storage_level: Vec<f64>,
    pub subperiod_weights: Vec<f64>,
    pub ledger: CostLedger,
}

impl Storage {
    pub fn new(
        name: impl Into<String>,
        zone: impl Into<String>,
        asset_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            asset_type: asset_type.into(),
            ..Default::default()
        }
    }

    pub fn with_existing_capacity(mut self, capacity: f64) -> Self {
        self.existing_capacity = capacity;
        self
    }

    pub fn with_investment(mut self, annualized_cost: f64, capital_recovery_period: u32) -> Self {
        self.capacity_expandable = true;
        self.annualized_investment_cost = annualized_cost;
        self.capital_recovery_period = capital_recovery_period;
        self
    }

    pub fn with_fixed_om(mut self, rate: f64) -> Self {
        self.fixed_om_cost = rate;
        self
    }

    pub fn capacity(&self) -> f64 {
        self.existing_capacity + self.new_capacity - self.retired_capacity
    }

    pub fn subperiod_weight(&self, t: usize) -> f64 {
        self.subperiod_weights.get(t).copied().unwrap_or(1.0)
    }
}

/// One price-tiered segment of demand that may go unserved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NsdSegment {
    /// Penalty price per unit of non-served demand
    pub price: f64,
    /// Maximum share of demand this segment may shed
    pub max_share: f64,
    /// Non-served quantity per subperiod (filled after solve)
    pub quantity: Vec<f64>,
}

/// One cost-tiered exogenous supply segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplySegment {
    /// Supply cost per unit
    pub cost: f64,
    /// Supplied quantity per subperiod (filled after solve)
    pub quantity: Vec<f64>,
}

/// Slack on one policy constraint the node participates in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySlack {
    /// Policy constraint identifier, e.g. "co2_cap"
    pub policy: String,
    /// Penalty price per unit of slack
    pub penalty: f64,
    /// Slack values per subperiod (filled after solve)
    pub values: Vec<f64>,
}

/// A commodity balance point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub zone: String,
    pub commodity: String,
    /// Commodity price per subperiod, if this node prices its commodity
    /// (fuel costs of outgoing edges are charged against it)
    pub price: Option<Vec<f64>>,
    pub nsd_segments: Vec<NsdSegment>,
    pub supply_segments: Vec<SupplySegment>,
    pub policy_slacks: Vec<PolicySlack>,
    /// Constraint duals by constraint identifier, attached after solve
    pub duals: BTreeMap<String, Vec<f64>>,
    pub subperiod_weights: Vec<f64>,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        zone: impl Into<String>,
        commodity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            commodity: commodity.into(),
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: Vec<f64>) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_nsd_segment(mut self, price: f64, max_share: f64) -> Self {
        self.nsd_segments.push(NsdSegment {
            price,
            max_share,
            quantity: Vec::new(),
        });
        self
    }

    pub fn with_supply_segment(mut self, cost: f64) -> Self {
        self.supply_segments.push(SupplySegment {
            cost,
            quantity: Vec::new(),
        });
        self
    }

    pub fn with_policy_slack(mut self, policy: impl Into<String>, penalty: f64) -> Self {
        self.policy_slacks.push(PolicySlack {
            policy: policy.into(),
            penalty,
            values: Vec::new(),
        });
        self
    }

    pub fn subperiod_weight(&self, t: usize) -> f64 {
        self.subperiod_weights.get(t).copied().unwrap_or(1.0)
    }
}

/// A stoichiometric conversion between commodities. Carries no capacity or
/// cost of its own; discounting and costing passes skip it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub name: String,
    pub zone: String,
}

impl Transformation {
    pub fn new(name: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
        }
    }
}

/// Common surface of components that carry capacity and investment cost.
///
/// The discounting passes and fixed-cost computers walk a period through
/// this trait instead of reflecting over concrete asset fields; each
/// concrete asset states explicitly what it exposes.
pub trait CapacityAsset {
    fn name(&self) -> &str;
    fn zone(&self) -> &str;
    fn asset_type(&self) -> &str;
    fn capacity_expandable(&self) -> bool;
    /// Total capacity after build and retirement decisions
    fn capacity(&self) -> f64;
    fn new_capacity(&self) -> f64;
    fn annualized_investment_cost(&self) -> f64;
    fn capital_recovery_period(&self) -> u32;
    fn fixed_om_rate(&self) -> f64;
    fn variable_om_rate(&self) -> f64;
    fn ledger(&self) -> &CostLedger;
    fn ledger_mut(&mut self) -> &mut CostLedger;
}

impl CapacityAsset for Edge {
    fn name(&self) -> &str {
        &self.name
    }

    fn zone(&self) -> &str {
        &self.zone
    }

    fn asset_type(&self) -> &str {
        &self.asset_type
    }

    fn capacity_expandable(&self) -> bool {
        self.capacity_expandable
    }

    fn capacity(&self) -> f64 {
        Edge::capacity(self)
    }

    fn new_capacity(&self) -> f64 {
        self.new_capacity
    }

    fn annualized_investment_cost(&self) -> f64 {
        self.annualized_investment_cost
    }

    fn capital_recovery_period(&self) -> u32 {
        self.capital_recovery_period
    }

    fn fixed_om_rate(&self) -> f64 {
        self.fixed_om_cost
    }

    fn variable_om_rate(&self) -> f64 {
        self.variable_om_cost
    }

    fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut CostLedger {
        &mut self.ledger
    }
}

impl CapacityAsset for Storage {
    fn name(&self) -> &str {
        &self.name
    }

    fn zone(&self) -> &str {
        &self.zone
    }

    fn asset_type(&self) -> &str {
        &self.asset_type
    }

    fn capacity_expandable(&self) -> bool {
        self.capacity_expandable
    }

    fn capacity(&self) -> f64 {
        Storage::capacity(self)
    }

    fn new_capacity(&self) -> f64 {
        self.new_capacity
    }

    fn annualized_investment_cost(&self) -> f64 {
        self.annualized_investment_cost
    }

    fn capital_recovery_period(&self) -> u32 {
        self.capital_recovery_period
    }

    fn fixed_om_rate(&self) -> f64 {
        self.fixed_om_cost
    }

    fn variable_om_rate(&self) -> f64 {
        0.0
    }

    fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut CostLedger {
        &mut self.ledger
    }
}
