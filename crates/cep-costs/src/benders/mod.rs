//! Benders decomposition result collection
//!
//! The decomposition splits the capacity-expansion problem into a
//! planning problem (capacity decisions) and independent operational
//! subproblems (dispatch given fixed capacities). This module owns the
//! post-solve side: gathering subproblem results, merging them
//! deterministically, and writing them back so downstream reporting is
//! agnostic to which algorithm produced the system.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  BENDERS RESULT COLLECTION                                       │
//! │  ─────────────────────────                                       │
//! │                                                                  │
//! │   subproblem 0 ─┐                                                │
//! │   subproblem 1 ─┼─► worker batches ─► merge (disjoint union)     │
//! │   ...           │                        │                       │
//! │   subproblem N ─┘                        ▼                       │
//! │                               SubproblemsData                    │
//! │                                          │                       │
//! │      period → subproblem mapping         │                       │
//! │                                          ▼                       │
//! │                   write-back onto planning periods               │
//! │            (flows, levels, NSD, slacks, duals, costs)            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collection supports a local sequential mode and a distributed mode
//! with one gather round-trip per worker; both produce identical output.
//! A failed subproblem, a duplicate merge key, or a mapping that
//! references a missing subproblem is fatal: no partial period results
//! are ever surfaced.

mod collect;
mod results;
mod subproblems;

pub use collect::{
    aggregate_operational_costs, collect_subproblems, merge_worker_batches, write_back_period,
    CollectionMode, WorkerBatch,
};
pub use results::{BendersIteration, BendersResults};
pub use subproblems::{PeriodSubproblemMap, SeriesMap, SubproblemResult, SubproblemsData};
