//! # cep-core: Capacity-Expansion Model Core
//!
//! Provides the data structures shared by the CEP costing and
//! decomposition engine: planning periods and their assets, case
//! settings, cost ledgers, and the unified error type.
//!
//! ## Design Philosophy
//!
//! Periods own complete copies of the network for their horizon slice:
//! - **Nodes**: commodity balance points with non-served-demand and
//!   supply segments, policy slacks, and post-solve duals
//! - **Edges / Storages**: capacity-bearing assets with investment and
//!   O&M cost rates plus solved decision values
//! - **Transformations**: stoichiometric conversions with no capacity
//!
//! Capacity-bearing assets carry a [`CostLedger`] with two alternate
//! views of the same period's cost rates (present value and cash flow),
//! guarded by an explicit [`CostBasis`] state tag so that reading a cost
//! before the discounting passes have run is a checked error.
//!
//! ## Quick Start
//!
//! ```rust
//! use cep_core::*;
//!
//! let settings = CaseSettings::new(0.05, vec![5, 5], SolutionAlgorithm::Monolithic)
//!     .expect("valid settings");
//! let mut case = Case::new(settings);
//!
//! let period = case.period_mut(1).expect("period 1 exists");
//! period.nodes.push(Node::new("elec_zone_a", "zone_a", "Electricity"));
//! period.edges.push(
//!     Edge::new("ccgt_zone_a", "zone_a", "NaturalGasCC", "gas_zone_a", "elec_zone_a")
//!         .with_investment(85_000.0, 20)
//!         .with_fixed_om(10_000.0)
//!         .with_variable_om(3.5),
//! );
//! ```

pub mod asset;
pub mod error;
pub mod model;
pub mod period;
pub mod settings;

pub use asset::{
    CapacityAsset, CostBasis, CostLedger, Edge, Node, NsdSegment, PolicySlack, Storage,
    SupplySegment, Transformation, UnitCommitment,
};
pub use error::{CepError, CepResult};
pub use model::ModelCosts;
pub use period::{Case, Period};
pub use settings::{CaseSettings, SolutionAlgorithm};
