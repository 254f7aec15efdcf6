//! Planning-period and case containers.

use serde::{Deserialize, Serialize};

use crate::asset::{CapacityAsset, Edge, Node, Storage, Transformation};
use crate::settings::CaseSettings;

/// One planning period with its own complete copy of the network and its
/// capacity and operational decision values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// 1-based index within the case horizon
    pub index: usize,
    pub edges: Vec<Edge>,
    pub storages: Vec<Storage>,
    pub nodes: Vec<Node>,
    pub transformations: Vec<Transformation>,
}

impl Period {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.name == name)
    }

    pub fn edge_mut(&mut self, name: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.name == name)
    }

    pub fn storage(&self, name: &str) -> Option<&Storage> {
        self.storages.iter().find(|s| s.name == name)
    }

    pub fn storage_mut(&mut self, name: &str) -> Option<&mut Storage> {
        self.storages.iter_mut().find(|s| s.name == name)
    }

    /// All capacity-bearing components of the period, edges first
    pub fn capacity_assets(&self) -> impl Iterator<Item = &dyn CapacityAsset> + '_ {
        self.edges
            .iter()
            .map(|e| e as &dyn CapacityAsset)
            .chain(self.storages.iter().map(|s| s as &dyn CapacityAsset))
    }

    /// Mutable view over all capacity-bearing components, edges first
    pub fn capacity_assets_mut(&mut self) -> impl Iterator<Item = &mut dyn CapacityAsset> + '_ {
        self.edges
            .iter_mut()
            .map(|e| e as &mut dyn CapacityAsset)
            .chain(self.storages.iter_mut().map(|s| s as &mut dyn CapacityAsset))
    }

    pub fn num_capacity_assets(&self) -> usize {
        self.edges.len() + self.storages.len()
    }
}

/// A full case: settings plus one period per horizon slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub settings: CaseSettings,
    pub periods: Vec<Period>,
}

impl Case {
    /// Create a case with one empty period per configured period length
    pub fn new(settings: CaseSettings) -> Self {
        let periods = (1..=settings.num_periods()).map(Period::new).collect();
        Self { settings, periods }
    }

    pub fn period(&self, index: usize) -> Option<&Period> {
        self.periods.iter().find(|p| p.index == index)
    }

    pub fn period_mut(&mut self, index: usize) -> Option<&mut Period> {
        self.periods.iter_mut().find(|p| p.index == index)
    }
}
