//! Cost and constraint terms of an optimal-control problem.
//!
//! Terms are grouped by where they are evaluated: at every trajectory
//! sample ([`IntermediateTerms`]), at the pre-jump state of each event, and
//! at the final time ([`EventTerms`]).

use strider_core::{StateConstraint, StateCost, StateInputConstraint, StateInputCost};

use crate::lagrangian::{StateAugmentedLagrangian, StateInputAugmentedLagrangian};

/// Terms evaluated at every sample `(t, x, u)`.
#[derive(Default)]
pub struct IntermediateTerms {
    pub costs: Vec<Box<dyn StateInputCost>>,
    pub state_eq_constraints: Vec<Box<dyn StateConstraint>>,
    pub state_input_eq_constraints: Vec<Box<dyn StateInputConstraint>>,
    pub state_eq_lagrangians: Vec<StateAugmentedLagrangian>,
    pub state_ineq_lagrangians: Vec<StateAugmentedLagrangian>,
    pub state_input_eq_lagrangians: Vec<StateInputAugmentedLagrangian>,
    pub state_input_ineq_lagrangians: Vec<StateInputAugmentedLagrangian>,
}

/// Terms evaluated on a state only, at an event or the final time.
#[derive(Default)]
pub struct EventTerms {
    pub costs: Vec<Box<dyn StateCost>>,
    pub state_eq_constraints: Vec<Box<dyn StateConstraint>>,
    pub state_eq_lagrangians: Vec<StateAugmentedLagrangian>,
    pub state_ineq_lagrangians: Vec<StateAugmentedLagrangian>,
}

/// All terms of a problem. Shared read-only between line-search trials.
#[derive(Default)]
pub struct OptimalControlProblem {
    pub intermediate: IntermediateTerms,
    pub pre_jump: EventTerms,
    pub final_: EventTerms,
}

impl OptimalControlProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running cost.
    #[must_use]
    pub fn with_cost(mut self, cost: impl StateInputCost + 'static) -> Self {
        self.intermediate.costs.push(Box::new(cost));
        self
    }

    /// Add a cost on the pre-jump state of every event.
    #[must_use]
    pub fn with_pre_jump_cost(mut self, cost: impl StateCost + 'static) -> Self {
        self.pre_jump.costs.push(Box::new(cost));
        self
    }

    /// Add a cost on the final state.
    #[must_use]
    pub fn with_final_cost(mut self, cost: impl StateCost + 'static) -> Self {
        self.final_.costs.push(Box::new(cost));
        self
    }

    /// Whether any term carries multipliers.
    pub fn has_lagrangians(&self) -> bool {
        let i = &self.intermediate;
        !(i.state_eq_lagrangians.is_empty()
            && i.state_ineq_lagrangians.is_empty()
            && i.state_input_eq_lagrangians.is_empty()
            && i.state_input_ineq_lagrangians.is_empty()
            && self.pre_jump.is_free_of_lagrangians()
            && self.final_.is_free_of_lagrangians())
    }
}

impl EventTerms {
    fn is_free_of_lagrangians(&self) -> bool {
        self.state_eq_lagrangians.is_empty() && self.state_ineq_lagrangians.is_empty()
    }
}
