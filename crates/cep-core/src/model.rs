//! Accessor for the solved model's named aggregate cost expressions.

use serde::{Deserialize, Serialize};

/// Named aggregate cost expressions read from a solved optimization model.
///
/// The modeling layer registers `FixedCost` / `VariableCost` expressions
/// and their discounted variants; reporting reads their solved values here
/// without touching the model handle itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCosts {
    pub fixed_cost: f64,
    pub variable_cost: f64,
    pub discounted_fixed_cost: f64,
    pub discounted_variable_cost: f64,
}

impl ModelCosts {
    /// Expected objective under the given reporting mode.
    ///
    /// The variable term is the only one multiplied by the squared
    /// unit-scaling factor: operational costs enter the objective as
    /// price times flow, both of which carry the scaling.
    pub fn expected_objective(&self, discounted: bool, scaling: f64) -> f64 {
        let (fixed, variable) = if discounted {
            (self.discounted_fixed_cost, self.discounted_variable_cost)
        } else {
            (self.fixed_cost, self.variable_cost)
        };
        fixed + variable * scaling * scaling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_objective_modes() {
        let costs = ModelCosts {
            fixed_cost: 10.0,
            variable_cost: 4.0,
            discounted_fixed_cost: 8.0,
            discounted_variable_cost: 3.0,
        };
        assert_eq!(costs.expected_objective(false, 1.0), 14.0);
        assert_eq!(costs.expected_objective(true, 1.0), 11.0);
        assert_eq!(costs.expected_objective(false, 2.0), 10.0 + 4.0 * 4.0);
    }
}
