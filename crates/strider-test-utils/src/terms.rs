//! Quadratic costs and affine constraints for building test problems.

use nalgebra::{DMatrix, DVector};
use strider_core::{StateConstraint, StateCost, StateInputConstraint, StateInputCost};

/// `L(x, u) = xᵀQx + uᵀRu`.
#[derive(Clone, Debug)]
pub struct QuadraticStateInputCost {
    pub q: DMatrix<f64>,
    pub r: DMatrix<f64>,
}

impl QuadraticStateInputCost {
    pub const fn new(q: DMatrix<f64>, r: DMatrix<f64>) -> Self {
        Self { q, r }
    }
}

impl StateInputCost for QuadraticStateInputCost {
    fn value(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> f64 {
        (x.transpose() * &self.q * x)[0] + (u.transpose() * &self.r * u)[0]
    }
}

/// `Φ(x) = xᵀQx`.
#[derive(Clone, Debug)]
pub struct QuadraticStateCost {
    pub q: DMatrix<f64>,
}

impl QuadraticStateCost {
    pub const fn new(q: DMatrix<f64>) -> Self {
        Self { q }
    }
}

impl StateCost for QuadraticStateCost {
    fn value(&self, _t: f64, x: &DVector<f64>) -> f64 {
        (x.transpose() * &self.q * x)[0]
    }
}

/// `h(x) = Cx + d`.
#[derive(Clone, Debug)]
pub struct LinearStateConstraint {
    pub c: DMatrix<f64>,
    pub d: DVector<f64>,
}

impl LinearStateConstraint {
    pub const fn new(c: DMatrix<f64>, d: DVector<f64>) -> Self {
        Self { c, d }
    }
}

impl StateConstraint for LinearStateConstraint {
    fn num_constraints(&self, _t: f64) -> usize {
        self.d.len()
    }

    fn value(&self, _t: f64, x: &DVector<f64>) -> DVector<f64> {
        &self.c * x + &self.d
    }
}

/// `h(x, u) = Cx + Du + e`.
#[derive(Clone, Debug)]
pub struct LinearStateInputConstraint {
    pub c: DMatrix<f64>,
    pub d: DMatrix<f64>,
    pub e: DVector<f64>,
}

impl LinearStateInputConstraint {
    pub const fn new(c: DMatrix<f64>, d: DMatrix<f64>, e: DVector<f64>) -> Self {
        Self { c, d, e }
    }
}

impl StateInputConstraint for LinearStateInputConstraint {
    fn num_constraints(&self, _t: f64) -> usize {
        self.e.len()
    }

    fn value(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.c * x + &self.d * u + &self.e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_costs() {
        let cost = QuadraticStateInputCost::new(DMatrix::identity(2, 2), DMatrix::from_element(1, 1, 2.0));
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let u = DVector::from_element(1, 3.0);
        assert!((cost.value(0.0, &x, &u) - 23.0).abs() < 1e-12);
        let terminal = QuadraticStateCost::new(DMatrix::identity(2, 2) * 0.5);
        assert!((terminal.value(0.0, &x) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn affine_constraints() {
        let c = LinearStateConstraint::new(DMatrix::from_row_slice(1, 2, &[1.0, -1.0]), DVector::from_element(1, 0.5));
        let x = DVector::from_vec(vec![1.0, 2.0]);
        assert_eq!(c.num_constraints(0.0), 1);
        assert!((c.value(0.0, &x)[0] + 0.5).abs() < 1e-12);
    }
}
