//! Cost line-item tables and aggregation helpers.
//!
//! Every reporting table shares the schema (zone, type, category, value).
//! Categories partition into FIXED (discounted by the period-start factor
//! alone) and VARIABLE-OPERATING (also multiplied by the opex annuity);
//! the aggregation engine relies on this partition being total.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Cost category of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CostCategory {
    Investment,
    FixedOm,
    VariableOm,
    Fuel,
    Startup,
    NonServedDemand,
    Supply,
    UnmetPolicyPenalty,
}

impl CostCategory {
    pub const ALL: [CostCategory; 8] = [
        CostCategory::Investment,
        CostCategory::FixedOm,
        CostCategory::VariableOm,
        CostCategory::Fuel,
        CostCategory::Startup,
        CostCategory::NonServedDemand,
        CostCategory::Supply,
        CostCategory::UnmetPolicyPenalty,
    ];

    /// Fixed costs are discounted by the period-start factor only; all
    /// other categories also carry the opex annuity multiplier.
    pub fn is_fixed(&self) -> bool {
        matches!(self, CostCategory::Investment | CostCategory::FixedOm)
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCategory::Investment => write!(f, "Investment"),
            CostCategory::FixedOm => write!(f, "Fixed OM"),
            CostCategory::VariableOm => write!(f, "Variable OM"),
            CostCategory::Fuel => write!(f, "Fuel"),
            CostCategory::Startup => write!(f, "Startup"),
            CostCategory::NonServedDemand => write!(f, "Non-Served Demand"),
            CostCategory::Supply => write!(f, "Supply"),
            CostCategory::UnmetPolicyPenalty => write!(f, "Unmet Policy Penalty"),
        }
    }
}

/// One cost line item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLineItem {
    pub zone: String,
    pub asset_type: String,
    pub category: CostCategory,
    pub value: f64,
}

/// An in-memory cost table with the fixed (zone, type, category, value)
/// schema. An empty table keeps the schema; zero assets never produce a
/// malformed result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostTable {
    rows: Vec<CostLineItem>,
}

impl CostTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        zone: impl Into<String>,
        asset_type: impl Into<String>,
        category: CostCategory,
        value: f64,
    ) {
        self.rows.push(CostLineItem {
            zone: zone.into(),
            asset_type: asset_type.into(),
            category,
            value,
        });
    }

    pub fn rows(&self) -> &[CostLineItem] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }

    /// Multiply every row by a flat factor
    pub fn scale(&mut self, factor: f64) {
        for row in &mut self.rows {
            row.value *= factor;
        }
    }

    /// Multiply every row by a category-dependent factor (vectorized
    /// discounting)
    pub fn scale_by_category(&mut self, factor: impl Fn(CostCategory) -> f64) {
        for row in &mut self.rows {
            row.value *= factor(row.category);
        }
    }

    /// Append all rows of another table, keeping duplicates
    pub fn extend_from(&mut self, other: &CostTable) {
        self.rows.extend(other.rows.iter().cloned());
    }

    /// Sum another table into this one by (zone, type, category) key
    pub fn merge_summed(&mut self, other: &CostTable) {
        for row in &other.rows {
            let existing = self.rows.iter_mut().find(|r| {
                r.zone == row.zone && r.asset_type == row.asset_type && r.category == row.category
            });
            match existing {
                Some(r) => r.value += row.value,
                None => self.rows.push(row.clone()),
            }
        }
    }
}

/// Group category of an aggregated row: a concrete cost category or the
/// synthetic grand total
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ReportCategory {
    Category(CostCategory),
    Total,
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCategory::Category(category) => category.fmt(f),
            ReportCategory::Total => write!(f, "Total"),
        }
    }
}

/// One aggregated row keyed by asset type or zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub category: ReportCategory,
    pub value: f64,
}

/// Group line items by (asset type, category), summing values.
/// Output order is deterministic: sorted by key, then category.
pub fn aggregate_by_type(table: &CostTable) -> Vec<AggregateRow> {
    aggregate_by(table, |row| row.asset_type.clone())
}

/// Group line items by (zone, category), summing values
pub fn aggregate_by_zone(table: &CostTable) -> Vec<AggregateRow> {
    aggregate_by(table, |row| row.zone.clone())
}

fn aggregate_by(table: &CostTable, key_of: impl Fn(&CostLineItem) -> String) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(String, CostCategory), f64> = BTreeMap::new();
    for row in table.rows() {
        *groups.entry((key_of(row), row.category)).or_insert(0.0) += row.value;
    }
    groups
        .into_iter()
        .map(|((key, category), value)| AggregateRow {
            key,
            category: ReportCategory::Category(category),
            value,
        })
        .collect()
}

/// Append one "Total"-keyed row per category plus a grand-total row.
///
/// The grand total sums the per-category totals of the already-grouped
/// rows: a group key that appears in several zones is counted once.
pub fn add_total_row(rows: &mut Vec<AggregateRow>) {
    let mut per_category: BTreeMap<CostCategory, f64> = BTreeMap::new();
    for row in rows.iter() {
        if row.key == "Total" {
            continue;
        }
        if let ReportCategory::Category(category) = row.category {
            *per_category.entry(category).or_insert(0.0) += row.value;
        }
    }
    let grand_total: f64 = per_category.values().sum();
    for (category, value) in per_category {
        rows.push(AggregateRow {
            key: "Total".to_string(),
            category: ReportCategory::Category(category),
            value,
        });
    }
    rows.push(AggregateRow {
        key: "Total".to_string(),
        category: ReportCategory::Total,
        value: grand_total,
    });
}
