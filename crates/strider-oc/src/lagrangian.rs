//! Named constraint functions paired with an augmented-Lagrangian penalty.

use std::sync::Arc;

use nalgebra::DVector;
use strider_core::{StateConstraint, StateInputConstraint, ValidationError};
use strider_penalty::{AugmentedPenalty, Multiplier};

/// Penalty contribution of one term at one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangianMetrics {
    pub name: Arc<str>,
    /// Summed penalty over constraint components.
    pub penalty: f64,
    /// Constraint value the penalty was evaluated at.
    pub constraint: DVector<f64>,
}

/// A constraint `h` of type `C` penalized by an [`AugmentedPenalty`].
///
/// `C` is `dyn StateConstraint` or `dyn StateInputConstraint`; see
/// [`StateAugmentedLagrangian`] and [`StateInputAugmentedLagrangian`].
pub struct AugmentedLagrangian<C: ?Sized> {
    name: Arc<str>,
    penalty: AugmentedPenalty,
    constraint: Box<C>,
}

pub type StateAugmentedLagrangian = AugmentedLagrangian<dyn StateConstraint>;
pub type StateInputAugmentedLagrangian = AugmentedLagrangian<dyn StateInputConstraint>;

impl<C: ?Sized> AugmentedLagrangian<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn penalty(&self) -> &AugmentedPenalty {
        &self.penalty
    }

    pub fn constraint(&self) -> &C {
        &self.constraint
    }

    fn metrics(
        &self,
        t: f64,
        h: DVector<f64>,
        multiplier: &Multiplier,
    ) -> Result<LagrangianMetrics, ValidationError> {
        check_components(&h, multiplier)?;
        Ok(LagrangianMetrics {
            name: Arc::clone(&self.name),
            penalty: self.penalty_sum(t, &multiplier.lagrangian, &h),
            constraint: h,
        })
    }

    fn initialize_with(&self, n: usize) -> Multiplier {
        Multiplier::filled(n, self.penalty.initialize_multiplier())
    }

    /// Next multipliers from a constraint value already evaluated at `t`.
    ///
    /// The returned penalty is the summed value at the new multipliers.
    pub fn update_from_constraint(
        &self,
        t: f64,
        h: &DVector<f64>,
        multiplier: &Multiplier,
    ) -> Result<Multiplier, ValidationError> {
        check_components(h, multiplier)?;
        let lagrangian = multiplier
            .lagrangian
            .zip_map(h, |l, hi| self.penalty.update_multiplier(t, l, hi));
        let penalty = self.penalty_sum(t, &lagrangian, h);
        Ok(Multiplier::new(penalty, lagrangian))
    }

    fn penalty_sum(&self, t: f64, lagrangian: &DVector<f64>, h: &DVector<f64>) -> f64 {
        lagrangian
            .iter()
            .zip(h.iter())
            .map(|(&l, &hi)| self.penalty.value(t, l, hi))
            .sum()
    }
}

fn check_components(h: &DVector<f64>, multiplier: &Multiplier) -> Result<(), ValidationError> {
    if multiplier.len() == h.len() {
        Ok(())
    } else {
        Err(ValidationError::DualLengthMismatch {
            partition: "multiplier components",
            expected: h.len(),
            got: multiplier.len(),
        })
    }
}

impl AugmentedLagrangian<dyn StateConstraint> {
    pub fn new(
        name: impl Into<Arc<str>>,
        constraint: impl StateConstraint + 'static,
        penalty: AugmentedPenalty,
    ) -> Self {
        Self {
            name: name.into(),
            penalty,
            constraint: Box::new(constraint),
        }
    }

    pub fn evaluate(
        &self,
        t: f64,
        x: &DVector<f64>,
        multiplier: &Multiplier,
    ) -> Result<LagrangianMetrics, ValidationError> {
        self.metrics(t, self.constraint.value(t, x), multiplier)
    }

    pub fn initialize(&self, t: f64) -> Multiplier {
        self.initialize_with(self.constraint.num_constraints(t))
    }

    pub fn update(
        &self,
        t: f64,
        x: &DVector<f64>,
        multiplier: &Multiplier,
    ) -> Result<Multiplier, ValidationError> {
        self.update_from_constraint(t, &self.constraint.value(t, x), multiplier)
    }
}

impl AugmentedLagrangian<dyn StateInputConstraint> {
    pub fn new(
        name: impl Into<Arc<str>>,
        constraint: impl StateInputConstraint + 'static,
        penalty: AugmentedPenalty,
    ) -> Self {
        Self {
            name: name.into(),
            penalty,
            constraint: Box::new(constraint),
        }
    }

    pub fn evaluate(
        &self,
        t: f64,
        x: &DVector<f64>,
        u: &DVector<f64>,
        multiplier: &Multiplier,
    ) -> Result<LagrangianMetrics, ValidationError> {
        self.metrics(t, self.constraint.value(t, x, u), multiplier)
    }

    pub fn initialize(&self, t: f64) -> Multiplier {
        self.initialize_with(self.constraint.num_constraints(t))
    }

    pub fn update(
        &self,
        t: f64,
        x: &DVector<f64>,
        u: &DVector<f64>,
        multiplier: &Multiplier,
    ) -> Result<Multiplier, ValidationError> {
        self.update_from_constraint(t, &self.constraint.value(t, x, u), multiplier)
    }
}
