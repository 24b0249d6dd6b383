//! Lagrange-multiplier containers attached to augmented-Lagrangian terms.

use nalgebra::DVector;

/// Multipliers of one augmented-Lagrangian term at one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Multiplier {
    /// Penalty value evaluated at these multipliers (diagnostic).
    pub penalty: f64,
    /// One multiplier per constraint component.
    pub lagrangian: DVector<f64>,
}

impl Multiplier {
    pub const fn new(penalty: f64, lagrangian: DVector<f64>) -> Self {
        Self {
            penalty,
            lagrangian,
        }
    }

    /// `n` multipliers all set to `value`, with zero recorded penalty.
    pub fn filled(n: usize, value: f64) -> Self {
        Self::new(0.0, DVector::from_element(n, value))
    }

    pub fn len(&self) -> usize {
        self.lagrangian.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lagrangian.is_empty()
    }
}

/// Multipliers of every augmented-Lagrangian term at one sample, grouped the
/// same way the problem groups its terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiplierCollection {
    pub state_eq: Vec<Multiplier>,
    pub state_ineq: Vec<Multiplier>,
    pub state_input_eq: Vec<Multiplier>,
    pub state_input_ineq: Vec<Multiplier>,
}

impl MultiplierCollection {
    /// Whether no term carries multipliers.
    pub fn is_empty(&self) -> bool {
        self.state_eq.is_empty()
            && self.state_ineq.is_empty()
            && self.state_input_eq.is_empty()
            && self.state_input_ineq.is_empty()
    }

    /// Total number of scalar multipliers across all terms.
    pub fn num_multipliers(&self) -> usize {
        [
            &self.state_eq,
            &self.state_ineq,
            &self.state_input_eq,
            &self.state_input_ineq,
        ]
        .iter()
        .flat_map(|group| group.iter())
        .map(Multiplier::len)
        .sum()
    }
}
