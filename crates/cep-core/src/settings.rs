//! Case-level configuration consumed by the costing passes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CepError, CepResult};

/// Temporal strategy used to solve the capacity-expansion problem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionAlgorithm {
    /// One monolithic problem over all periods (full foresight)
    #[default]
    Monolithic,
    /// Period-by-period iteration; each period only sees its own horizon
    Myopic,
    /// Planning problem plus per-subperiod operational subproblems
    Benders,
}

impl fmt::Display for SolutionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionAlgorithm::Monolithic => write!(f, "monolithic"),
            SolutionAlgorithm::Myopic => write!(f, "myopic"),
            SolutionAlgorithm::Benders => write!(f, "benders"),
        }
    }
}

impl std::str::FromStr for SolutionAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monolithic" => Ok(SolutionAlgorithm::Monolithic),
            "myopic" => Ok(SolutionAlgorithm::Myopic),
            "benders" => Ok(SolutionAlgorithm::Benders),
            _ => Err(format!("Unknown solution algorithm: {}", s)),
        }
    }
}

/// Read-only case settings shared by every costing pass.
///
/// `period_lengths` carries one positive length in years per planning
/// period, in horizon order. Periods are addressed 1-based throughout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSettings {
    /// Annual discount rate, non-negative
    pub discount_rate: f64,
    /// Length in years of each planning period
    pub period_lengths: Vec<u32>,
    /// Temporal solution strategy
    pub solution_algorithm: SolutionAlgorithm,
}

impl CaseSettings {
    /// Create validated settings
    pub fn new(
        discount_rate: f64,
        period_lengths: Vec<u32>,
        solution_algorithm: SolutionAlgorithm,
    ) -> CepResult<Self> {
        let settings = Self {
            discount_rate,
            period_lengths,
            solution_algorithm,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON document and validate them
    pub fn from_json(text: &str) -> CepResult<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants the costing passes rely on
    pub fn validate(&self) -> CepResult<()> {
        if !(self.discount_rate >= 0.0) {
            return Err(CepError::Config(format!(
                "discount rate must be non-negative, got {}",
                self.discount_rate
            )));
        }
        if let Some(pos) = self.period_lengths.iter().position(|&len| len == 0) {
            return Err(CepError::Config(format!(
                "period {} has zero length",
                pos + 1
            )));
        }
        Ok(())
    }

    /// Number of planning periods in the case
    pub fn num_periods(&self) -> usize {
        self.period_lengths.len()
    }

    /// Length in years of the given (1-based) period
    pub fn period_length(&self, period_index: usize) -> CepResult<u32> {
        period_index
            .checked_sub(1)
            .and_then(|i| self.period_lengths.get(i))
            .copied()
            .ok_or_else(|| {
                CepError::Config(format!(
                    "period index {} out of range ({} periods)",
                    period_index,
                    self.period_lengths.len()
                ))
            })
    }
}
